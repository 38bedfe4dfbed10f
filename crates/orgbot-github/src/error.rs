//! Error types for the GitHub client.

use thiserror::Error;

/// Errors from the GitHub API client.
#[derive(Debug, Error)]
pub enum GithubError {
    /// Failed to build the underlying HTTP client.
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),

    /// Transport-level failure (connection, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// GitHub answered with an unexpected status for a membership check.
    #[error("unexpected membership response: status {status}, body: {body}")]
    UnexpectedMembershipStatus { status: u16, body: String },

    /// GitHub rejected an invitation for a reason other than
    /// "already a member".
    #[error("invitation rejected: status {status}: {message}")]
    InvitationRejected { status: u16, message: String },
}
