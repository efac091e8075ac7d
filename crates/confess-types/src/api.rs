use serde::{Deserialize, Serialize};

use crate::models::{Confession, ReactionCounts};

// -- Submissions --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitConfessionRequest {
    pub text: String,
    /// Category name as submitted by the client; validated server-side so
    /// a bad value yields a proper validation message, not a decode error.
    pub category: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitConfessionResponse {
    pub message: String,
    pub id: String,
}

// -- Reactions --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateReactionsRequest {
    pub reactions: ReactionCounts,
}

// -- Stats --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Count of approved confessions (the only ones the public feed shows).
    pub total_confessions: i64,
    pub total_reactions: i64,
    pub pending_count: i64,
}

// -- Admin auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub message: String,
}

// -- Moderation --

#[derive(Debug, Serialize)]
pub struct ApproveResponse {
    pub message: String,
    pub confession: Confession,
}

/// Plain `{message}` acknowledgement used by mutations that return no data.
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub message: String,
}
