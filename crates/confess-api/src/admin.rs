use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use confess_types::api::{AckResponse, ApproveResponse};
use confess_types::models::{Confession, Status, Verdict};

use crate::auth::AppState;
use crate::confessions::to_confession;
use crate::error::ApiError;

/// The moderation queue: everything still awaiting a verdict, newest first.
pub async fn list_pending(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = tokio::task::spawn_blocking(move || {
        state.db.list_confessions(Some(Status::Pending), None, None)
    })
    .await??;

    let confessions: Vec<Confession> = rows.into_iter().map(to_confession).collect();
    Ok(Json(confessions))
}

/// Publish a confession to the public feed. Approving an already-approved
/// confession is a harmless no-op.
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = tokio::task::spawn_blocking(move || state.db.set_status(&id, Verdict::Approved))
        .await??
        .ok_or(ApiError::NotFound("Confession"))?;

    Ok(Json(ApproveResponse {
        message: "Confession approved".to_string(),
        confession: to_confession(row),
    }))
}

/// Remove a confession permanently, whatever state it is in. Its display
/// id is retired with it.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted =
        tokio::task::spawn_blocking(move || state.db.delete_confession(&id)).await??;

    if !deleted {
        return Err(ApiError::NotFound("Confession"));
    }

    Ok(Json(AckResponse {
        message: "Confession deleted".to_string(),
    }))
}
