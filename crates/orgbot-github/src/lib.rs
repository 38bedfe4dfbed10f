//! GitHub REST client for organization membership checks and invitations.
//!
//! Wraps `reqwest::Client` with the two calls the invite bot needs:
//! "is this user already a member of the org?" and "invite this user".
//! Response classification follows the GitHub REST API v3 contract.

mod client;
mod error;

pub use client::{GithubClient, InviteOutcome};
pub use error::GithubError;
