//! API error type.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::ledger::LedgerError;

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request input failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Ledger read failure behind a read endpoint.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// JSON body for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            ApiError::Ledger(e) => {
                tracing::error!("ledger error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "an unexpected error occurred".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
