use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use confess_db::models::ConfessionRow;
use confess_types::api::{
    StatsResponse, SubmitConfessionRequest, SubmitConfessionResponse, UpdateReactionsRequest,
};
use confess_types::models::{Category, Confession, ReactionCounts, Status};

use crate::auth::AppState;
use crate::error::{ApiError, ApiJson};

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub search: Option<String>,
    /// Passed through to the store as-is: an unknown category simply
    /// matches nothing, it is not a client error.
    pub category: Option<String>,
}

/// The public feed: approved confessions only, newest first.
pub async fn list_approved(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = tokio::task::spawn_blocking(move || {
        state.db.list_confessions(
            Some(Status::Approved),
            query.search.as_deref(),
            query.category.as_deref(),
        )
    })
    .await??;

    let confessions: Vec<Confession> = rows.into_iter().map(to_confession).collect();
    Ok(Json(confessions))
}

pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let stats = tokio::task::spawn_blocking(move || state.db.stats()).await??;

    Ok(Json(StatsResponse {
        total_confessions: stats.total_approved,
        total_reactions: stats.total_reactions,
        pending_count: stats.pending_count,
    }))
}

/// Anonymous submission. The new confession lands in the review queue and
/// stays invisible to the public feed until an admin approves it.
pub async fn submit(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SubmitConfessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = Category::parse(&req.category)
        .ok_or_else(|| ApiError::Validation(format!("Unknown category '{}'", req.category)))?;

    let row =
        tokio::task::spawn_blocking(move || state.db.create_confession(&req.text, category))
            .await??;

    Ok((
        StatusCode::CREATED,
        Json(SubmitConfessionResponse {
            message: "Confession submitted for review".to_string(),
            id: row.id,
        }),
    ))
}

/// Fold a caller's reaction snapshot into the stored counters and return
/// the updated confession. No auth: reacting is a public action.
pub async fn react(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateReactionsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let row = tokio::task::spawn_blocking(move || state.db.merge_reactions(&id, req.reactions))
        .await??
        .ok_or(ApiError::NotFound("Confession"))?;

    Ok(Json(to_confession(row)))
}

/// Map a store row to the wire model. Corrupt fields are logged and
/// replaced with defaults rather than failing the whole listing.
pub(crate) fn to_confession(row: ConfessionRow) -> Confession {
    Confession {
        id: row.id.parse().unwrap_or_else(|e| {
            warn!("Corrupt confession id '{}': {}", row.id, e);
            Uuid::default()
        }),
        category: Category::parse(&row.category).unwrap_or_else(|| {
            warn!("Corrupt category '{}' on confession '{}'", row.category, row.id);
            Category::Other
        }),
        status: Status::parse(&row.status).unwrap_or_else(|| {
            warn!("Corrupt status '{}' on confession '{}'", row.status, row.id);
            Status::Pending
        }),
        reactions: ReactionCounts {
            love: clamp_counter(row.love, "love", &row.id),
            laugh: clamp_counter(row.laugh, "laugh", &row.id),
            fire: clamp_counter(row.fire, "fire", &row.id),
        },
        created_at: row
            .created_at
            .parse::<chrono::DateTime<chrono::Utc>>()
            .or_else(|_| {
                // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
                // Parse as naive UTC and convert.
                chrono::NaiveDateTime::parse_from_str(&row.created_at, "%Y-%m-%d %H:%M:%S")
                    .map(|ndt| ndt.and_utc())
            })
            .unwrap_or_else(|e| {
                warn!("Corrupt created_at '{}' on confession '{}': {}", row.created_at, row.id, e);
                chrono::DateTime::default()
            }),
        display_id: row.display_id,
        text: row.text,
    }
}

fn clamp_counter(value: i64, field: &str, id: &str) -> u32 {
    u32::try_from(value).unwrap_or_else(|_| {
        warn!("Corrupt {} counter {} on confession '{}'", field, value, id);
        0
    })
}
