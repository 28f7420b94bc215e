//! Error types for the code assist relay
//!
//! Every failure a request can hit is one `RelayError`. Handlers turn it
//! into a `{ "error": ... }` body via `to_response`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RelayError>;

/// Body returned to the caller on any failure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum RelayError {
    /// The backend answered with a non-success status
    #[error("Error from {backend} API: {body}")]
    Upstream {
        backend: &'static str,
        status: u16,
        body: String,
    },

    /// The backend could not be reached (connection or timeout failure)
    #[error("Failed to reach {backend} API: {source}")]
    Transport {
        backend: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered 2xx but the envelope could not be decoded
    #[error("Unexpected response from {backend} API: {message}")]
    InvalidResponse {
        backend: &'static str,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Startup error: {0}")]
    Startup(String),
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert to HTTP status code and error response
    pub fn to_response(&self) -> (StatusCode, Json<ErrorResponse>) {
        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        log::error!("Error: {}", self);
        self.to_response().into_response()
    }
}
