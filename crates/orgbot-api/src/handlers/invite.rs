//! Batch trigger handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::{error, info};

use crate::engine::BatchSummary;
use crate::error::ApiError;
use crate::models::InviteRange;
use crate::router::InviteState;

/// POST /invite
///
/// Reconcile all purchase rows in the given spreadsheet range. Once the
/// range validates, the response is 200 with no body regardless of
/// row-level outcomes; those are observable through the ledger read
/// endpoints and the logs.
pub async fn run_invite_batch(
    State(state): State<InviteState>,
    payload: Result<Json<InviteRange>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(range) =
        payload.map_err(|e| ApiError::Validation(format!("invalid request body: {e}")))?;

    if range.start.trim().is_empty() || range.end.trim().is_empty() {
        return Err(ApiError::Validation(
            "start and end range cells are required".to_string(),
        ));
    }

    let rows = match state.rows.fetch_range(&range.start, &range.end).await {
        Ok(rows) => rows,
        Err(e) => {
            error!(start = %range.start, end = %range.end, error = %e, "failed to fetch rows");
            return Ok(StatusCode::OK);
        }
    };

    let results = state.engine.reconcile_batch(&rows).await;
    let summary = BatchSummary::from_results(&results);
    info!(
        rows = rows.len(),
        invited = summary.invited,
        already_member = summary.already_member,
        already_resolved = summary.already_resolved,
        failed = summary.failed,
        aborted = summary.aborted,
        "invite batch completed"
    );

    Ok(StatusCode::OK)
}
