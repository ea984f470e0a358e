//! Applying an authorized interaction to a post.
//!
//! The recorder only mutates the in-memory document. Persisting it as one
//! atomic write is the job of [`crate::service::PostService`].

use chrono::{DateTime, Utc};

use crate::domain::{Caller, Interaction, InteractionKind, Post};
use crate::error::DomainError;
use crate::lifecycle;

/// An interaction as requested by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionRequest {
    Like,
    Dislike,
    Comment(String),
}

impl InteractionRequest {
    pub fn kind(&self) -> InteractionKind {
        match self {
            InteractionRequest::Like => InteractionKind::Like,
            InteractionRequest::Dislike => InteractionKind::Dislike,
            InteractionRequest::Comment(_) => InteractionKind::Comment,
        }
    }
}

/// Append `request` to the ledger of `post` and update its counters.
///
/// The caller must already have been authorized for this interaction.
pub fn record<'a>(
    post: &'a mut Post,
    caller: &Caller,
    request: &InteractionRequest,
    now: DateTime<Utc>,
) -> Result<&'a Interaction, DomainError> {
    let text = match request {
        InteractionRequest::Comment(text) if text.trim().is_empty() => {
            return Err(DomainError::InvalidInput(
                "Comment text must not be empty".to_string(),
            ));
        }
        InteractionRequest::Comment(text) => Some(text.clone()),
        InteractionRequest::Like | InteractionRequest::Dislike => None,
    };

    let kind = request.kind();
    match kind {
        InteractionKind::Like => post.likes += 1,
        InteractionKind::Dislike => post.dislikes += 1,
        InteractionKind::Comment => {}
    }
    if kind.is_scoring() {
        post.interest_score += 1;
    }

    let remaining = lifecycle::remaining_time(post, now);
    post.interactions.push(Interaction {
        time: now,
        kind,
        actor_id: caller.id,
        actor_name: caller.name.clone(),
        text,
        remaining_at_time: remaining.to_string(),
    });

    tracing::debug!(
        post_id = %post.id,
        actor_id = %caller.id,
        kind = kind.as_str(),
        likes = post.likes,
        dislikes = post.dislikes,
        "Interaction recorded"
    );

    // Just pushed, so the ledger is non-empty.
    Ok(&post.interactions[post.interactions.len() - 1])
}

/// Confirmation shown to the actor, e.g. "ben liked ana's post".
pub fn confirmation(kind: InteractionKind, actor_name: &str, author_name: &str) -> String {
    let verb = match kind {
        InteractionKind::Like => "liked",
        InteractionKind::Dislike => "disliked",
        InteractionKind::Comment => "commented on",
    };
    format!("{} {} {}'s post", actor_name, verb, author_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewPost, Topic};
    use chrono::TimeDelta;
    use uuid::Uuid;

    fn live_post(now: DateTime<Utc>) -> Post {
        let author = Caller::new(Uuid::new_v4(), "ana");
        Post::new(
            &author,
            NewPost {
                title: "Flu season".to_string(),
                text: "Get your shot".to_string(),
                topics: vec![Topic::Health],
                duration_minutes: 5,
            },
            now,
        )
        .unwrap()
    }

    #[test]
    fn test_like_bumps_likes_and_score() {
        let now = Utc::now();
        let mut post = live_post(now);
        let ben = Caller::new(Uuid::new_v4(), "ben");

        let entry = record(&mut post, &ben, &InteractionRequest::Like, now).unwrap();
        assert_eq!(entry.kind, InteractionKind::Like);
        assert_eq!(entry.actor_name, "ben");
        assert_eq!(entry.text, None);

        assert_eq!(post.likes, 1);
        assert_eq!(post.dislikes, 0);
        assert_eq!(post.interest_score, 1);
    }

    #[test]
    fn test_dislike_mirrors_like() {
        let now = Utc::now();
        let mut post = live_post(now);
        let ben = Caller::new(Uuid::new_v4(), "ben");

        record(&mut post, &ben, &InteractionRequest::Dislike, now).unwrap();
        assert_eq!(post.likes, 0);
        assert_eq!(post.dislikes, 1);
        assert_eq!(post.interest_score, 1);
    }

    #[test]
    fn test_comment_leaves_counters_alone() {
        let now = Utc::now();
        let mut post = live_post(now);
        let ben = Caller::new(Uuid::new_v4(), "ben");

        record(
            &mut post,
            &ben,
            &InteractionRequest::Comment("hi".to_string()),
            now,
        )
        .unwrap();

        assert_eq!(post.interactions.len(), 1);
        assert_eq!(post.interactions[0].text.as_deref(), Some("hi"));
        assert_eq!((post.likes, post.dislikes, post.interest_score), (0, 0, 0));
    }

    #[test]
    fn test_blank_comment_is_rejected_without_side_effects() {
        let now = Utc::now();
        let mut post = live_post(now);
        let ben = Caller::new(Uuid::new_v4(), "ben");

        let result = record(
            &mut post,
            &ben,
            &InteractionRequest::Comment("  ".to_string()),
            now,
        );
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
        assert!(post.interactions.is_empty());
    }

    #[test]
    fn test_entry_freezes_remaining_time() {
        let now = Utc::now();
        let mut post = live_post(now);
        let ben = Caller::new(Uuid::new_v4(), "ben");

        let later = now + TimeDelta::seconds(90);
        let entry = record(&mut post, &ben, &InteractionRequest::Like, later).unwrap();
        assert_eq!(entry.time, later);
        assert_eq!(entry.remaining_at_time, "3 minutes and 30 seconds");
    }

    #[test]
    fn test_score_tracks_likes_plus_dislikes() {
        let now = Utc::now();
        let mut post = live_post(now);
        let ben = Caller::new(Uuid::new_v4(), "ben");
        let requests = [
            InteractionRequest::Like,
            InteractionRequest::Dislike,
            InteractionRequest::Comment("meh".to_string()),
            InteractionRequest::Like,
            InteractionRequest::Like,
        ];

        for request in &requests {
            record(&mut post, &ben, request, now).unwrap();
            assert_eq!(post.likes + post.dislikes, post.interest_score);
        }
        assert_eq!(post.interactions.len(), requests.len());
    }

    #[test]
    fn test_confirmation_names_actor_and_author() {
        assert_eq!(
            confirmation(InteractionKind::Comment, "ben", "ana"),
            "ben commented on ana's post"
        );
        assert_eq!(
            confirmation(InteractionKind::Dislike, "ben", "ana"),
            "ben disliked ana's post"
        );
    }
}
