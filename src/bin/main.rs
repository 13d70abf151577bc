#[cfg(not(target_arch = "wasm32"))]
mod native {
    extern crate bord_threads;

    use std::sync::Arc;

    use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
    use bord_threads::{Limits, MemoryStore};
    use tracing::{error, info, warn};
    use tracing_subscriber::EnvFilter;

    mod adapter {
        use actix_web::HttpRequest;
        use spin_sdk::http::{Method, Request, Response};

        pub fn actix_to_spin_request(
            req: &HttpRequest,
            body: actix_web::web::Bytes,
        ) -> anyhow::Result<Request> {
            let method = match req.method().as_str() {
                "GET" => Method::Get,
                "POST" => Method::Post,
                "PUT" => Method::Put,
                "DELETE" => Method::Delete,
                "HEAD" => Method::Head,
                "OPTIONS" => Method::Options,
                "PATCH" => Method::Patch,
                other => anyhow::bail!("unsupported method {}", other),
            };

            let uri = req.uri().to_string();

            let mut req_builder = Request::builder();
            let mut with_headers = req_builder.method(method).uri(&uri);
            for (name, value) in req.headers() {
                if let Ok(val_str) = value.to_str() {
                    with_headers = with_headers.header(name.as_str(), val_str);
                }
            }

            Ok(with_headers.body(body.to_vec()).build())
        }

        pub fn spin_to_actix_response(spin_resp: Response) -> actix_web::HttpResponse {
            let status = *spin_resp.status();
            let body = spin_resp.body().to_vec();

            actix_web::HttpResponse::build(
                actix_web::http::StatusCode::from_u16(status)
                    .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR),
            )
            .content_type("application/json")
            .body(body)
        }
    }

    struct AppState {
        store: MemoryStore,
        limits: Limits,
    }

    pub async fn run() -> std::io::Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();

        let state = Arc::new(AppState {
            store: MemoryStore::new(),
            limits: Limits::from_env(),
        });
        if std::env::var("BORD_SEED").is_ok() {
            if let Err(err) = bord_threads::common::db::init_demo_data(&state.store) {
                warn!(error = %err, "demo data not initialized");
            }
        }

        let addr = bord_threads::config::bind_addr();
        info!(%addr, "server listening");

        let data = web::Data::from(state);
        HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .default_service(web::route().to(handle_all))
        })
        .bind(addr)?
        .run()
        .await
    }

    async fn handle_all(
        state: web::Data<AppState>,
        req: HttpRequest,
        body: web::Bytes,
    ) -> HttpResponse {
        let spin_req = match adapter::actix_to_spin_request(&req, body) {
            Ok(r) => r,
            Err(_) => {
                return HttpResponse::BadRequest()
                    .json(serde_json::json!({"error": "Invalid request"}))
            }
        };

        match bord_threads::handlers::dispatch(&state.store, state.limits, spin_req) {
            Ok(spin_resp) => adapter::spin_to_actix_response(spin_resp),
            Err(err) => {
                error!(error = %err, path = req.path(), "request failed");
                HttpResponse::InternalServerError()
                    .json(serde_json::json!({"error": "Internal server error"}))
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    native::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {}
