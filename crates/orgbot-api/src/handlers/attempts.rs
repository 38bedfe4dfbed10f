//! Ledger read handlers.

use axum::extract::State;
use axum::Json;

use orgbot_db::InvitationStatus;

use crate::error::ApiError;
use crate::models::AttemptResponse;
use crate::router::InviteState;

/// GET /success — lineages that reached the succeeded terminal state.
pub async fn list_succeeded(
    State(state): State<InviteState>,
) -> Result<Json<Vec<AttemptResponse>>, ApiError> {
    let attempts = state
        .ledger
        .list_by_status(InvitationStatus::Succeeded)
        .await?;
    Ok(Json(attempts.into_iter().map(Into::into).collect()))
}

/// GET /failed — lineages whose last attempt failed (retry-eligible).
pub async fn list_failed(
    State(state): State<InviteState>,
) -> Result<Json<Vec<AttemptResponse>>, ApiError> {
    let attempts = state.ledger.list_by_status(InvitationStatus::Failed).await?;
    Ok(Json(attempts.into_iter().map(Into::into).collect()))
}
