/// Database row types. These map directly to SQLite rows and stay
/// distinct from the wire models in confess-types.

pub struct ConfessionRow {
    pub id: String,
    pub text: String,
    pub category: String,
    pub status: String,
    pub love: i64,
    pub laugh: i64,
    pub fire: i64,
    pub created_at: String,
    pub display_id: i64,
}

pub struct AdminRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub created_at: String,
}

/// Aggregates for the public stats endpoint, computed in one pass.
pub struct StoreStats {
    pub total_approved: i64,
    pub total_reactions: i64,
    pub pending_count: i64,
}
