//! Request and response models for the invite API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use orgbot_db::{InvitationAttempt, InvitationStatus};

/// Body of `POST /invite`: the spreadsheet range to reconcile.
#[derive(Debug, Deserialize)]
pub struct InviteRange {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
}

/// A ledger row as exposed by the read endpoints.
#[derive(Debug, Serialize)]
pub struct AttemptResponse {
    pub id: Uuid,
    pub order_id: i64,
    pub username: String,
    pub email: String,
    pub status: InvitationStatus,
    pub first_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<InvitationAttempt> for AttemptResponse {
    fn from(a: InvitationAttempt) -> Self {
        Self {
            id: a.id,
            order_id: a.order_id,
            username: a.username,
            email: a.email,
            status: a.status,
            first_error: a.first_error,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}
