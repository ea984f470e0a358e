use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a user did to a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Like,
    Dislike,
    Comment,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Like => "like",
            InteractionKind::Dislike => "dislike",
            InteractionKind::Comment => "comment",
        }
    }

    /// Whether this kind counts towards a post's interest score.
    pub fn is_scoring(&self) -> bool {
        matches!(self, InteractionKind::Like | InteractionKind::Dislike)
    }
}

/// One entry of a post's interaction ledger. Never modified once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub time: DateTime<Utc>,
    pub kind: InteractionKind,
    pub actor_id: Uuid,
    pub actor_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Time left until expiration when the interaction happened,
    /// e.g. "4 minutes and 12 seconds".
    pub remaining_at_time: String,
}
