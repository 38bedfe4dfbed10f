//! Error types for the sheets client.

use thiserror::Error;

/// Errors from the Feishu sheets client.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// Failed to build the underlying HTTP client.
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),

    /// Transport-level failure (connection, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The platform answered with a non-zero application code.
    #[error("api error: code {code}: {message}")]
    Api { code: i64, message: String },

    /// A response body did not match the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The spreadsheet has no sheets to read from.
    #[error("spreadsheet has no sheets")]
    NoSheets,
}
