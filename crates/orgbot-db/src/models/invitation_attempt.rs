//! Invitation attempt model.
//!
//! One row per invitation lineage: the identity-scoped history of attempts
//! to invite one person into the organization. The lineage id is minted
//! once and reused across retries; only `status`, `first_error` and
//! `updated_at` mutate after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Lifecycle state of an invitation lineage.
///
/// `Succeeded` is terminal; `Failed` lineages are retried on the next
/// batch run under the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invitation_status", rename_all = "lowercase")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvitationStatus {
    Pending,
    Succeeded,
    Failed,
}

/// A durable record of one invitation lineage.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct InvitationAttempt {
    /// Lineage identifier, stable across retries.
    pub id: Uuid,

    /// Purchase order that authorizes the invitation.
    pub order_id: i64,

    /// Invitee's username on the target platform.
    pub username: String,

    /// Invitee's email address.
    pub email: String,

    /// Current lifecycle state.
    pub status: InvitationStatus,

    /// Error captured on the first failure of this lineage.
    /// Never overwritten by later failures; cleared on success.
    pub first_error: Option<String>,

    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last status transition.
    pub updated_at: DateTime<Utc>,
}

/// Data required to open a new invitation lineage.
#[derive(Debug, Clone)]
pub struct NewInvitationAttempt {
    pub id: Uuid,
    pub order_id: i64,
    pub username: String,
    pub email: String,
}

impl InvitationAttempt {
    /// Create a new lineage in `pending` state.
    pub async fn create(pool: &PgPool, data: &NewInvitationAttempt) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r"
            INSERT INTO invitation_attempts (id, order_id, username, email, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING *
            ",
        )
        .bind(data.id)
        .bind(data.order_id)
        .bind(&data.username)
        .bind(&data.email)
        .fetch_one(pool)
        .await
    }

    /// Find the authoritative lineage for an identity.
    ///
    /// Matches on username OR email; an empty field never matches, so two
    /// purchasers who each lack the same field stay distinct. Prefers the
    /// most recently updated unresolved lineage; a succeeded lineage is
    /// returned only when it is the sole match, so callers can
    /// short-circuit on it.
    pub async fn find_active_lineage(
        pool: &PgPool,
        username: &str,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM invitation_attempts
            WHERE (username = $1 AND $1 <> '') OR (email = $2 AND $2 <> '')
            ORDER BY (status = 'succeeded') ASC, updated_at DESC
            LIMIT 1
            ",
        )
        .bind(username)
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Transition a lineage to a new status.
    ///
    /// `first_error` is written only when the column is still NULL, so the
    /// root-cause error of a lineage survives later retries. A transition
    /// to `succeeded` clears it.
    pub async fn update_status(
        pool: &PgPool,
        id: Uuid,
        status: InvitationStatus,
        first_error: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r"
            UPDATE invitation_attempts
            SET status = $2,
                first_error = CASE
                    WHEN $2 = 'succeeded' THEN NULL
                    WHEN first_error IS NULL THEN $3
                    ELSE first_error
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(status)
        .bind(first_error)
        .fetch_one(pool)
        .await
    }

    /// List all lineages with the given status, newest first.
    pub async fn list_by_status(
        pool: &PgPool,
        status: InvitationStatus,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM invitation_attempts
            WHERE status = $1
            ORDER BY updated_at DESC
            ",
        )
        .bind(status)
        .fetch_all(pool)
        .await
    }
}
