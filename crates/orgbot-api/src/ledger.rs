//! Invitation ledger access contract.
//!
//! The engine talks to durable storage through the `InvitationLedger`
//! trait so the reconciliation logic can be exercised without Postgres.
//! `PgLedger` is the production implementation, delegating to the model
//! queries in `orgbot-db`.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use orgbot_db::{InvitationAttempt, InvitationStatus, NewInvitationAttempt};

/// Ledger read or write failure.
///
/// A ledger error aborts reconciliation for the affected row only; the
/// row's lineage stays in its previous state and is retried next run.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger query failed: {0}")]
    Query(String),
}

/// Durable store of invitation attempts, keyed by identity.
#[async_trait]
pub trait InvitationLedger: Send + Sync {
    /// Find the authoritative lineage matching `username` OR `email`,
    /// preferring the most recently updated unresolved one. An empty
    /// field never matches. A succeeded lineage is returned only when
    /// nothing else matches.
    async fn find_active_lineage(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<InvitationAttempt>, LedgerError>;

    /// Open a new lineage in pending state.
    async fn create(&self, data: NewInvitationAttempt) -> Result<InvitationAttempt, LedgerError>;

    /// Transition a lineage; `first_error` is written only if still unset.
    async fn update_status(
        &self,
        id: Uuid,
        status: InvitationStatus,
        first_error: Option<&str>,
    ) -> Result<InvitationAttempt, LedgerError>;

    /// All lineages currently in the given status, newest first.
    async fn list_by_status(
        &self,
        status: InvitationStatus,
    ) -> Result<Vec<InvitationAttempt>, LedgerError>;
}

/// Postgres-backed ledger.
#[derive(Clone)]
pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitationLedger for PgLedger {
    async fn find_active_lineage(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<InvitationAttempt>, LedgerError> {
        InvitationAttempt::find_active_lineage(&self.pool, username, email)
            .await
            .map_err(|e| LedgerError::Query(e.to_string()))
    }

    async fn create(&self, data: NewInvitationAttempt) -> Result<InvitationAttempt, LedgerError> {
        InvitationAttempt::create(&self.pool, &data)
            .await
            .map_err(|e| LedgerError::Query(e.to_string()))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: InvitationStatus,
        first_error: Option<&str>,
    ) -> Result<InvitationAttempt, LedgerError> {
        InvitationAttempt::update_status(&self.pool, id, status, first_error)
            .await
            .map_err(|e| LedgerError::Query(e.to_string()))
    }

    async fn list_by_status(
        &self,
        status: InvitationStatus,
    ) -> Result<Vec<InvitationAttempt>, LedgerError> {
        InvitationAttempt::list_by_status(&self.pool, status)
            .await
            .map_err(|e| LedgerError::Query(e.to_string()))
    }
}
