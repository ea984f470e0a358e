use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Caller, Interaction, Topic};
use crate::error::DomainError;
use crate::lifecycle::{self, PostStatus};

/// Post entity - a short-lived message open to interactions until it expires.
///
/// The post's status is deliberately not a field: it is always derived from
/// `expiration_time` via [`Post::status_at`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub title: String,
    pub text: String,
    pub topics: Vec<Topic>,
    pub created_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub expiration_time: DateTime<Utc>,
    pub likes: u64,
    pub dislikes: u64,
    pub interest_score: u64,
    pub interactions: Vec<Interaction>,
    /// Optimistic concurrency token, bumped by the store on every write.
    pub version: u64,
}

/// Fields supplied by an author when publishing.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub text: String,
    pub topics: Vec<Topic>,
    pub duration_minutes: u32,
}

/// Descriptive fields an author may change while the post is live.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub text: Option<String>,
    pub topics: Option<Vec<Topic>>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.text.is_none() && self.topics.is_none()
    }
}

impl Post {
    /// Create a new post authored by `author` at `now`.
    pub fn new(author: &Caller, draft: NewPost, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let title = required_text("title", draft.title)?;
        let text = required_text("text", draft.text)?;
        let topics = required_topics(draft.topics)?;

        Ok(Self {
            id: Uuid::new_v4(),
            author_id: author.id,
            author_name: author.name.clone(),
            title,
            text,
            topics,
            created_at: now,
            duration_minutes: draft.duration_minutes,
            expiration_time: lifecycle::expiration_for(now, draft.duration_minutes),
            likes: 0,
            dislikes: 0,
            interest_score: 0,
            interactions: Vec::new(),
            version: 0,
        })
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> PostStatus {
        lifecycle::status(self, now)
    }

    pub fn has_topic(&self, topic: Topic) -> bool {
        self.topics.contains(&topic)
    }

    /// Apply an author's edit. Validation happens before anything is touched,
    /// so a rejected edit leaves the post as it was.
    pub fn apply_changes(&mut self, changes: PostChanges) -> Result<(), DomainError> {
        if changes.is_empty() {
            return Err(DomainError::InvalidInput(
                "At least one of title, text or topics must be provided".to_string(),
            ));
        }

        let title = changes
            .title
            .map(|t| required_text("title", t))
            .transpose()?;
        let text = changes.text.map(|t| required_text("text", t)).transpose()?;
        let topics = changes.topics.map(required_topics).transpose()?;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(text) = text {
            self.text = text;
        }
        if let Some(topics) = topics {
            self.topics = topics;
        }
        Ok(())
    }
}

fn required_text(field: &str, value: String) -> Result<String, DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(value)
}

fn required_topics(topics: Vec<Topic>) -> Result<Vec<Topic>, DomainError> {
    if topics.is_empty() {
        return Err(DomainError::InvalidInput(
            "At least one topic is required".to_string(),
        ));
    }
    Ok(topics)
}

/// Parse a post id from its textual form. A malformed id cannot name any
/// stored post, so it is reported as not found.
pub fn parse_post_id(raw: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw).map_err(|_| DomainError::post_not_found(raw))
}

/// A post as returned by discovery queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostView {
    /// The whole document, ledger included.
    Full(Post),
    /// Counters and descriptive fields only; the ledger has been stripped.
    Summary(Post),
}

impl PostView {
    pub fn summary(mut post: Post) -> Self {
        post.interactions = Vec::new();
        PostView::Summary(post)
    }

    pub fn post(&self) -> &Post {
        match self {
            PostView::Full(post) | PostView::Summary(post) => post,
        }
    }

    pub fn includes_interactions(&self) -> bool {
        matches!(self, PostView::Full(_))
    }

    pub fn into_post(self) -> Post {
        match self {
            PostView::Full(post) | PostView::Summary(post) => post,
        }
    }
}
