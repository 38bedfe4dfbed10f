//! Invitation reconciliation engine and HTTP API.
//!
//! The engine takes purchase rows from the order spreadsheet, decides for
//! each whether an organization invitation is needed, issues it through
//! the sender collaborator, and records the outcome in the durable
//! invitation ledger. Rows are independent units of work: re-running a
//! batch over overlapping data is always safe because an unresolved
//! lineage is reused rather than recreated.

pub mod collaborators;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod router;

pub use engine::{
    BatchSummary, InvitationSender, Membership, MembershipOracle, Reconciliation, ReconcileEngine,
    ReconcileError, RowOutcome, RowSource, RowSourceError, SendOutcome, SenderError,
};
pub use error::ApiError;
pub use ledger::{InvitationLedger, LedgerError, PgLedger};
pub use router::{invite_router, InviteState};
