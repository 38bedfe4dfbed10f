//! Durable storage for the organization invite bot.
//!
//! Holds the invitation ledger: every invitation attempt against the
//! organization is recorded here, keyed by a lineage id that survives
//! retries. Connection pooling and embedded migrations live here too.

pub mod error;
pub mod models;
pub mod pool;

pub use error::DbError;
pub use models::{InvitationAttempt, InvitationStatus, NewInvitationAttempt};
pub use pool::{connect, run_migrations};
