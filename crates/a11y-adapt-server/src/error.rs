//! Shell error type and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use a11y_adapt::AdaptError;

#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Adapt(#[from] AdaptError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Adapt(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON error response with the message under `key`.
    pub fn into_response_keyed(self, key: &str) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        } else {
            tracing::warn!("Rejected request: {self}");
        }
        (status, Json(json!({ key: self.to_string() }))).into_response()
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        self.into_response_keyed("error")
    }
}
