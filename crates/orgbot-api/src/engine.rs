//! Invitation reconciliation engine.
//!
//! For each purchase row the engine determines prior state from the
//! ledger, decides whether to skip, retry, or open a new lineage, calls
//! the membership oracle and invitation sender as needed, and writes the
//! resulting state back. Holding no locks across the external calls, a
//! dropped (cancelled) reconciliation leaves its lineage pending for a
//! future run.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use orgbot_db::{InvitationAttempt, InvitationStatus, NewInvitationAttempt};
use orgbot_sheets::OrderRow;

use crate::ledger::{InvitationLedger, LedgerError};

/// Answer from the membership oracle.
///
/// `Unknown` covers transport failures and unexpected responses: the
/// oracle is best effort, so an inconclusive answer never blocks the
/// invitation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Member,
    NotMember,
    Unknown,
}

/// Checks whether a username already belongs to the organization.
#[async_trait]
pub trait MembershipOracle: Send + Sync {
    async fn membership(&self, username: &str) -> Membership;
}

/// Successful classifications of an invitation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Created,
    AlreadyInvited,
}

/// Hard failure from the invitation sender.
#[derive(Debug, Error)]
pub enum SenderError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("platform rejected invitation: {0}")]
    Rejected(String),
}

/// Issues an organization invitation for an identity.
#[async_trait]
pub trait InvitationSender: Send + Sync {
    async fn invite(&self, username: &str, email: &str) -> Result<SendOutcome, SenderError>;
}

/// Failure fetching purchase rows for a range.
#[derive(Debug, Error)]
#[error("row source error: {0}")]
pub struct RowSourceError(pub String);

/// Yields purchase rows for a requested spreadsheet range.
#[async_trait]
pub trait RowSource: Send + Sync {
    async fn fetch_range(&self, start: &str, end: &str) -> Result<Vec<OrderRow>, RowSourceError>;
}

/// How a single row was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    /// Invitation issued (or the platform reported it as already issued).
    Invited,
    /// The oracle confirmed existing membership; no invitation was sent.
    AlreadyMember,
    /// A succeeded lineage already covers this identity; nothing was done.
    AlreadyResolved,
    /// The sender rejected the invitation; the lineage is retry-eligible.
    Failed,
}

/// Result of reconciling one row.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub outcome: RowOutcome,
    pub attempt: InvitationAttempt,
}

/// Error that aborted reconciliation of a row before it was finalized.
///
/// Sender rejections are not errors at this level: they finalize the
/// lineage as failed and complete the row. Only a ledger failure leaves a
/// row unfinalized.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// The reconciliation engine.
pub struct ReconcileEngine {
    ledger: Arc<dyn InvitationLedger>,
    sender: Arc<dyn InvitationSender>,
    oracle: Option<Arc<dyn MembershipOracle>>,
}

impl ReconcileEngine {
    pub fn new(
        ledger: Arc<dyn InvitationLedger>,
        sender: Arc<dyn InvitationSender>,
        oracle: Option<Arc<dyn MembershipOracle>>,
    ) -> Self {
        Self {
            ledger,
            sender,
            oracle,
        }
    }

    /// Reconcile a single purchase row.
    ///
    /// Looks up the authoritative lineage for the row's identity, reuses
    /// it when unresolved, creates a fresh pending one otherwise, and
    /// drives it to a terminal state through the collaborators. When a
    /// lineage is reused its original identity fields stay authoritative;
    /// the current row's values are not written over them.
    pub async fn reconcile(&self, row: &OrderRow) -> Result<Reconciliation, ReconcileError> {
        let existing = self
            .ledger
            .find_active_lineage(&row.username, &row.email)
            .await?;

        let attempt = match existing {
            Some(attempt) if attempt.status == InvitationStatus::Succeeded => {
                debug!(
                    order_id = row.order_id,
                    username = %row.username,
                    lineage = %attempt.id,
                    "identity already resolved, skipping"
                );
                return Ok(Reconciliation {
                    outcome: RowOutcome::AlreadyResolved,
                    attempt,
                });
            }
            Some(attempt) => {
                debug!(
                    order_id = row.order_id,
                    username = %attempt.username,
                    lineage = %attempt.id,
                    "reusing unresolved lineage"
                );
                attempt
            }
            None => {
                self.ledger
                    .create(NewInvitationAttempt {
                        id: Uuid::new_v4(),
                        order_id: row.order_id,
                        username: row.username.clone(),
                        email: row.email.clone(),
                    })
                    .await?
            }
        };

        // Best-effort pre-check: a confirmed member may have been invited
        // out of band, so the lineage is still finalized as succeeded.
        if let Some(oracle) = &self.oracle {
            match oracle.membership(&attempt.username).await {
                Membership::Member => {
                    let finalized = self
                        .ledger
                        .update_status(attempt.id, InvitationStatus::Succeeded, None)
                        .await?;
                    info!(
                        order_id = finalized.order_id,
                        username = %finalized.username,
                        lineage = %finalized.id,
                        "already an organization member, marked succeeded"
                    );
                    return Ok(Reconciliation {
                        outcome: RowOutcome::AlreadyMember,
                        attempt: finalized,
                    });
                }
                Membership::NotMember => {}
                Membership::Unknown => {
                    warn!(
                        username = %attempt.username,
                        "membership check inconclusive, attempting invitation anyway"
                    );
                }
            }
        }

        match self.sender.invite(&attempt.username, &attempt.email).await {
            Ok(sent) => {
                let finalized = self
                    .ledger
                    .update_status(attempt.id, InvitationStatus::Succeeded, None)
                    .await?;
                info!(
                    order_id = finalized.order_id,
                    username = %finalized.username,
                    lineage = %finalized.id,
                    already_invited = (sent == SendOutcome::AlreadyInvited),
                    "invitation succeeded"
                );
                Ok(Reconciliation {
                    outcome: RowOutcome::Invited,
                    attempt: finalized,
                })
            }
            Err(sender_error) => {
                let message = sender_error.to_string();
                let finalized = self
                    .ledger
                    .update_status(attempt.id, InvitationStatus::Failed, Some(&message))
                    .await?;
                warn!(
                    order_id = finalized.order_id,
                    username = %finalized.username,
                    lineage = %finalized.id,
                    error = %sender_error,
                    "invitation failed, will retry next run"
                );
                Ok(Reconciliation {
                    outcome: RowOutcome::Failed,
                    attempt: finalized,
                })
            }
        }
    }

    /// Reconcile a batch of rows independently.
    ///
    /// A ledger or sender failure on one row never halts the rest; the
    /// returned results align with the input order.
    pub async fn reconcile_batch(
        &self,
        rows: &[OrderRow],
    ) -> Vec<Result<Reconciliation, ReconcileError>> {
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let result = self.reconcile(row).await;
            if let Err(e) = &result {
                error!(
                    order_id = row.order_id,
                    username = %row.username,
                    error = %e,
                    "row reconciliation aborted, lineage left unfinalized"
                );
            }
            results.push(result);
        }
        results
    }
}

/// Aggregate counts over a batch, for logging.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub invited: usize,
    pub already_member: usize,
    pub already_resolved: usize,
    pub failed: usize,
    pub aborted: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[Result<Reconciliation, ReconcileError>]) -> Self {
        let mut summary = Self::default();
        for result in results {
            match result {
                Ok(r) => match r.outcome {
                    RowOutcome::Invited => summary.invited += 1,
                    RowOutcome::AlreadyMember => summary.already_member += 1,
                    RowOutcome::AlreadyResolved => summary.already_resolved += 1,
                    RowOutcome::Failed => summary.failed += 1,
                },
                Err(_) => summary.aborted += 1,
            }
        }
        summary
    }
}
