use http::StatusCode;
use spin_sdk::http::Response;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Parent post not found: {0}")]
    InvalidParent(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Deadline exceeded after {0} ms")]
    DeadlineExceeded(u128),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Error::StorageUnavailable(err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidParent(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::StorageUnavailable(err.to_string())
    }
}

impl From<Error> for Response {
    fn from(err: Error) -> Self {
        let body = serde_json::json!({ "error": err.to_string() });
        Response::builder()
            .status(err.status().as_u16())
            .header("Content-Type", "application/json")
            .body(body.to_string().into_bytes())
            .build()
    }
}
