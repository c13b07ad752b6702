//! Error types for the newsletter server
//!
//! Every failure is converted into one of these kinds at the boundary of the
//! operation that produced it. Only `Validation` and `NotFound` messages reach
//! the client verbatim; the rest are logged and replaced by a generic body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

// == App Error Enum ==
/// Unified error type for the newsletter server.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// User-supplied data is malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing credentials or secrets
    #[error("Configuration error: {0}")]
    Config(String),

    /// Newsletter platform returned non-2xx or could not be reached
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Unknown article or subscriber
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error kind.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Config(_) | AppError::Upstream(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to the client.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::Config(_) => "Server configuration error.".to_string(),
            AppError::Upstream(_) | AppError::Internal(_) => {
                "An internal error occurred. Please try again later.".to_string()
            }
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = Json(ErrorResponse::new(self.public_message()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the newsletter server.
pub type Result<T> = std::result::Result<T, AppError>;
