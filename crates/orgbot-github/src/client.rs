//! GitHub HTTP client (reqwest-based).

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::GithubError;

const GITHUB_API_VERSION: &str = "2022-11-28";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Result of an invitation call.
///
/// Both variants are successful terminal outcomes: `AlreadyInvited` means
/// the platform reports the account is already part of the organization,
/// which the bot treats as an idempotent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteOutcome {
    Created,
    AlreadyInvited,
}

/// Request body for `POST /orgs/{org}/invitations`.
#[derive(Debug, Serialize)]
struct InviteRequest<'a> {
    email: &'a str,
    role: &'a str,
    team_ids: &'a [i64],
}

/// Error body GitHub returns for rejected invitations.
#[derive(Debug, Default, Deserialize)]
struct InviteErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<InviteErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
struct InviteErrorDetail {
    #[serde(default)]
    message: String,
}

impl InviteErrorBody {
    /// True when any error detail says the account is already in the org.
    fn is_already_member(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.message.contains("already a part of this organization"))
    }

    fn first_message(&self) -> &str {
        self.errors
            .first()
            .map(|e| e.message.as_str())
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.message)
    }
}

/// GitHub REST client scoped to one organization.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: Client,
    base_url: String,
    org: String,
    token: String,
}

impl GithubClient {
    /// Create a new client for the given organization.
    ///
    /// `base_url` defaults to the public API when `None`; injectable for
    /// tests and GitHub Enterprise installs.
    pub fn new(org: String, token: String, base_url: Option<String>) -> Result<Self, GithubError> {
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent("orgbot/0.1")
            .build()
            .map_err(|e| GithubError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        let base_url = base_url
            .unwrap_or_else(|| "https://api.github.com".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            http,
            base_url,
            org,
            token,
        })
    }

    /// Check whether `username` is already a member of the organization.
    ///
    /// `GET /orgs/{org}/members/{username}`: 204 means member, 302 and 404
    /// mean not a member; anything else is an error the caller decides how
    /// to treat.
    pub async fn check_membership(&self, username: &str) -> Result<bool, GithubError> {
        let url = format!("{}/orgs/{}/members/{}", self.base_url, self.org, username);
        let response = self
            .http
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .bearer_auth(&self.token)
            .send()
            .await?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(true),
            StatusCode::FOUND | StatusCode::NOT_FOUND => Ok(false),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(GithubError::UnexpectedMembershipStatus {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    /// Invite a user into the organization by email.
    ///
    /// `POST /orgs/{org}/invitations`: 201 means the invitation was
    /// created. A rejection whose error detail says the account is already
    /// part of the organization maps to `InviteOutcome::AlreadyInvited`;
    /// any other rejection is a hard failure.
    pub async fn invite(&self, username: &str, email: &str) -> Result<InviteOutcome, GithubError> {
        let url = format!("{}/orgs/{}/invitations", self.base_url, self.org);
        let body = InviteRequest {
            email,
            role: "direct_member",
            team_ids: &[],
        };

        let response = self
            .http
            .post(&url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::CREATED {
            debug!(username, email, "invitation created");
            return Ok(InviteOutcome::Created);
        }

        let text = response.text().await.unwrap_or_default();
        let error_body: InviteErrorBody = serde_json::from_str(&text).unwrap_or_default();

        if error_body.is_already_member() {
            debug!(username, "already part of the organization, skipping");
            return Ok(InviteOutcome::AlreadyInvited);
        }

        Err(GithubError::InvitationRejected {
            status: status.as_u16(),
            message: error_body.first_message().to_string(),
        })
    }
}
