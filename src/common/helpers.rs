use chrono::{DateTime, Utc};
use serde::Serialize;
use spin_sdk::http::{Request, Response};
use tracing::warn;
use uuid::Uuid;

use crate::common::errors::{Error, Result};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn validate_uuid(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

pub fn json_response<T: Serialize>(status: u16, value: &T) -> anyhow::Result<Response> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(value)?)
        .build())
}

/// Serializes `result` with `status` on success, or maps the error to its
/// status code.
pub fn respond<T: Serialize>(status: u16, result: Result<T>) -> anyhow::Result<Response> {
    match result {
        Ok(value) => json_response(status, &value),
        Err(err) => {
            if let Error::StorageUnavailable(msg) = &err {
                warn!(error = %msg, "storage failure");
            }
            Ok(err.into())
        }
    }
}

pub fn not_found() -> anyhow::Result<Response> {
    json_response(404, &serde_json::json!({"error": "No route found"}))
}

pub fn body_json(req: &Request) -> Result<serde_json::Value> {
    serde_json::from_slice(req.body())
        .map_err(|_| Error::BadRequest("invalid JSON body".to_string()))
}

/// A UUID-valued string field of a JSON body.
pub fn id_field(value: &serde_json::Value, field: &str) -> Result<String> {
    match value[field].as_str() {
        Some(id) if validate_uuid(id) => Ok(id.to_string()),
        _ => Err(Error::BadRequest(format!("{} must be a valid id", field))),
    }
}
