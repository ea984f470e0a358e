//! Who may do what to a post, and when.

use chrono::{DateTime, Utc};

use crate::domain::{Caller, InteractionKind, Post};
use crate::lifecycle::{self, PostStatus};

/// An operation that changes a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Like,
    Dislike,
    Comment,
    Update,
    Delete,
}

impl From<InteractionKind> for Action {
    fn from(kind: InteractionKind) -> Self {
        match kind {
            InteractionKind::Like => Action::Like,
            InteractionKind::Dislike => Action::Dislike,
            InteractionKind::Comment => Action::Comment,
        }
    }
}

/// Reason an action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    Expired,
    SelfInteraction,
    NotOwner,
}

/// Decide whether `caller` may perform `action` on `post` at `now`.
///
/// Liveness is checked first, then identity. Repeated interactions by the
/// same caller are allowed; there is no per-user deduplication.
pub fn authorize(
    post: &Post,
    caller: &Caller,
    action: Action,
    now: DateTime<Utc>,
) -> Result<(), Denial> {
    if lifecycle::status(post, now) == PostStatus::Expired {
        return Err(Denial::Expired);
    }

    let is_author = caller.id == post.author_id;
    match action {
        Action::Like | Action::Dislike | Action::Comment if is_author => {
            Err(Denial::SelfInteraction)
        }
        Action::Update | Action::Delete if !is_author => Err(Denial::NotOwner),
        _ => Ok(()),
    }
}
