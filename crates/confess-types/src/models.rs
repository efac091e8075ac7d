use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed set of categories a confession is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Funny,
    Crush,
    Hostel,
    Sad,
    Roast,
    Academic,
    Friendship,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Funny => "funny",
            Category::Crush => "crush",
            Category::Hostel => "hostel",
            Category::Sad => "sad",
            Category::Roast => "roast",
            Category::Academic => "academic",
            Category::Friendship => "friendship",
            Category::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "funny" => Some(Category::Funny),
            "crush" => Some(Category::Crush),
            "hostel" => Some(Category::Hostel),
            "sad" => Some(Category::Sad),
            "roast" => Some(Category::Roast),
            "academic" => Some(Category::Academic),
            "friendship" => Some(Category::Friendship),
            "other" => Some(Category::Other),
            _ => None,
        }
    }
}

/// Where a confession sits in the moderation lifecycle. Every confession
/// starts out `pending`; only `approved` ones appear in the public feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Approved,
    Rejected,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Approved => "approved",
            Status::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Status::Pending),
            "approved" => Some(Status::Approved),
            "rejected" => Some(Status::Rejected),
            _ => None,
        }
    }
}

/// The two outcomes a moderator can assign. There is deliberately no
/// `Pending` variant here: once moderated, a confession cannot go back
/// into the review queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approved,
    Rejected,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Approved => "approved",
            Verdict::Rejected => "rejected",
        }
    }
}

/// Per-confession emoji counters. Counters are non-negative and only ever
/// grow; there is no decrement anywhere in the system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReactionCounts {
    pub love: u32,
    pub laugh: u32,
    pub fire: u32,
}

/// A confession as served over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confession {
    pub id: Uuid,
    pub text: String,
    pub category: Category,
    pub status: Status,
    pub reactions: ReactionCounts,
    pub created_at: DateTime<Utc>,
    /// Human-facing sequential label (`#007`), assigned once at creation
    /// and never reused, even after deletion.
    pub display_id: i64,
}
