//! Router and shared state for the invite API.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::engine::{ReconcileEngine, RowSource};
use crate::handlers;
use crate::ledger::InvitationLedger;

/// Shared state for the invite routes.
#[derive(Clone)]
pub struct InviteState {
    /// Durable invitation ledger, also used by the read endpoints.
    pub ledger: Arc<dyn InvitationLedger>,
    /// Source of purchase rows for a requested range.
    pub rows: Arc<dyn RowSource>,
    /// The reconciliation engine.
    pub engine: Arc<ReconcileEngine>,
}

impl InviteState {
    pub fn new(
        ledger: Arc<dyn InvitationLedger>,
        rows: Arc<dyn RowSource>,
        engine: Arc<ReconcileEngine>,
    ) -> Self {
        Self {
            ledger,
            rows,
            engine,
        }
    }
}

/// Create the invite router.
///
/// - `POST /invite` — reconcile a spreadsheet range; 200 with no body once
///   input validation passes (row-level failures are logged, not surfaced)
/// - `GET /success` — succeeded ledger rows as a JSON array
/// - `GET /failed` — failed ledger rows as a JSON array
pub fn invite_router(state: InviteState) -> Router {
    Router::new()
        .route("/invite", post(handlers::invite::run_invite_batch))
        .route("/success", get(handlers::attempts::list_succeeded))
        .route("/failed", get(handlers::attempts::list_failed))
        .with_state(state)
}
