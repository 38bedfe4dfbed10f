//! Bindings from the concrete HTTP clients to the engine's collaborator
//! traits.
//!
//! The GitHub client serves as both membership oracle and invitation
//! sender; the sheets client serves as row source. Oracle transport
//! failures map to `Membership::Unknown` so an unreachable oracle never
//! blocks an invitation attempt.

use async_trait::async_trait;
use tracing::warn;

use orgbot_github::{GithubClient, GithubError, InviteOutcome};
use orgbot_sheets::{OrderRow, SheetsClient};

use crate::engine::{
    InvitationSender, Membership, MembershipOracle, RowSource, RowSourceError, SendOutcome,
    SenderError,
};

#[async_trait]
impl MembershipOracle for GithubClient {
    async fn membership(&self, username: &str) -> Membership {
        match self.check_membership(username).await {
            Ok(true) => Membership::Member,
            Ok(false) => Membership::NotMember,
            Err(e) => {
                warn!(username, error = %e, "membership check failed");
                Membership::Unknown
            }
        }
    }
}

#[async_trait]
impl InvitationSender for GithubClient {
    async fn invite(&self, username: &str, email: &str) -> Result<SendOutcome, SenderError> {
        match GithubClient::invite(self, username, email).await {
            Ok(InviteOutcome::Created) => Ok(SendOutcome::Created),
            Ok(InviteOutcome::AlreadyInvited) => Ok(SendOutcome::AlreadyInvited),
            Err(GithubError::InvitationRejected { status, message }) => {
                Err(SenderError::Rejected(format!("status {status}: {message}")))
            }
            Err(e) => Err(SenderError::Transport(e.to_string())),
        }
    }
}

#[async_trait]
impl RowSource for SheetsClient {
    async fn fetch_range(&self, start: &str, end: &str) -> Result<Vec<OrderRow>, RowSourceError> {
        self.fetch_rows(start, end)
            .await
            .map_err(|e| RowSourceError(e.to_string()))
    }
}
