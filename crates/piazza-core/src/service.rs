//! Post service - the entry point for every post operation.
//!
//! Each mutation is a read-modify-write of a single post document closed by a
//! compare-and-swap on its version. A lost race reloads the post and runs the
//! whole cycle again, status and authorization included.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::authorizer::{self, Action};
use crate::domain::{Caller, NewPost, Post, PostChanges, PostView};
use crate::error::{DomainError, RepoError};
use crate::ports::{Clock, PostRepository};
use crate::query::TopicQuery;
use crate::recorder::{self, InteractionRequest};

/// Attempts at a conflicting write before giving up.
pub const MAX_WRITE_ATTEMPTS: u32 = 5;

/// Result of a successful like, dislike or comment.
#[derive(Debug, Clone)]
pub struct InteractionReceipt {
    pub post: Post,
    pub message: String,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    clock: Arc<dyn Clock>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { posts, clock }
    }

    /// Current instant according to the service clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    #[tracing::instrument(skip(self, caller, draft), fields(author_id = %caller.id))]
    pub async fn create_post(&self, caller: &Caller, draft: NewPost) -> Result<Post, DomainError> {
        let post = Post::new(caller, draft, self.clock.now())?;
        let saved = self.posts.insert(post).await?;

        tracing::info!(
            post_id = %saved.id,
            expires_at = %saved.expiration_time,
            "Post created"
        );
        Ok(saved)
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Post, DomainError> {
        self.load(id).await
    }

    pub async fn like(&self, caller: &Caller, id: Uuid) -> Result<InteractionReceipt, DomainError> {
        self.interact(caller, id, InteractionRequest::Like).await
    }

    pub async fn dislike(
        &self,
        caller: &Caller,
        id: Uuid,
    ) -> Result<InteractionReceipt, DomainError> {
        self.interact(caller, id, InteractionRequest::Dislike).await
    }

    pub async fn comment(
        &self,
        caller: &Caller,
        id: Uuid,
        text: String,
    ) -> Result<InteractionReceipt, DomainError> {
        self.interact(caller, id, InteractionRequest::Comment(text))
            .await
    }

    #[tracing::instrument(skip(self, caller, changes), fields(caller_id = %caller.id))]
    pub async fn update_post(
        &self,
        caller: &Caller,
        id: Uuid,
        changes: PostChanges,
    ) -> Result<Post, DomainError> {
        let updated = self
            .mutate(id, |post, now| {
                authorizer::authorize(post, caller, Action::Update, now)?;
                if changes.is_empty() {
                    return Err(DomainError::InvalidInput(
                        "At least one of title, text or topics must be provided".to_string(),
                    ));
                }
                post.apply_changes(changes.clone())
            })
            .await?;

        tracing::info!(post_id = %id, "Post updated");
        Ok(updated)
    }

    #[tracing::instrument(skip(self, caller), fields(caller_id = %caller.id))]
    pub async fn delete_post(&self, caller: &Caller, id: Uuid) -> Result<(), DomainError> {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let post = self.load(id).await?;
            authorizer::authorize(&post, caller, Action::Delete, self.clock.now())
                .inspect_err(|denial| tracing::warn!(post_id = %id, ?denial, "Delete refused"))?;

            match self.posts.delete_if_version(id, post.version).await {
                Ok(()) => {
                    tracing::info!(post_id = %id, "Post deleted");
                    return Ok(());
                }
                Err(RepoError::Conflict) => {
                    tracing::warn!(post_id = %id, attempt, "Post changed during delete, retrying");
                }
                Err(RepoError::NotFound) => return Err(DomainError::post_not_found(id)),
                Err(e) => return Err(e.into()),
            }
        }

        Err(write_attempts_exhausted(id))
    }

    pub async fn list_by_topic(&self, query: TopicQuery) -> Result<Vec<PostView>, DomainError> {
        let posts = self.posts.find_by_topic(&query, self.clock.now()).await?;
        let views: Vec<PostView> = posts
            .into_iter()
            .take(query.limit())
            .map(|post| query.view(post))
            .collect();

        tracing::debug!(
            topic = %query.topic,
            filter = ?query.filter,
            interest = ?query.interest,
            count = views.len(),
            "Topic listing"
        );
        Ok(views)
    }

    #[tracing::instrument(skip(self, caller, request), fields(caller_id = %caller.id, kind = request.kind().as_str()))]
    async fn interact(
        &self,
        caller: &Caller,
        id: Uuid,
        request: InteractionRequest,
    ) -> Result<InteractionReceipt, DomainError> {
        let kind = request.kind();
        let post = self
            .mutate(id, |post, now| {
                authorizer::authorize(post, caller, kind.into(), now).inspect_err(|denial| {
                    tracing::warn!(post_id = %id, ?denial, "Interaction refused")
                })?;
                recorder::record(post, caller, &request, now)?;
                Ok(())
            })
            .await?;

        let message = recorder::confirmation(kind, &caller.name, &post.author_name);
        Ok(InteractionReceipt { post, message })
    }

    /// Load, change and conditionally save a post, retrying on write conflicts.
    ///
    /// `apply` sees a freshly loaded post and a fresh instant on every attempt.
    async fn mutate<F>(&self, id: Uuid, mut apply: F) -> Result<Post, DomainError>
    where
        F: FnMut(&mut Post, DateTime<Utc>) -> Result<(), DomainError> + Send,
    {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let mut post = self.load(id).await?;
            apply(&mut post, self.clock.now())?;

            match self.posts.replace_if_version(post).await {
                Ok(saved) => return Ok(saved),
                Err(RepoError::Conflict) => {
                    tracing::warn!(post_id = %id, attempt, "Concurrent write on post, retrying");
                }
                Err(RepoError::NotFound) => return Err(DomainError::post_not_found(id)),
                Err(e) => {
                    tracing::error!(post_id = %id, error = %e, "Failed to save post");
                    return Err(e.into());
                }
            }
        }

        Err(write_attempts_exhausted(id))
    }

    async fn load(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(id))
    }
}

fn write_attempts_exhausted(id: Uuid) -> DomainError {
    tracing::error!(post_id = %id, attempts = MAX_WRITE_ATTEMPTS, "Giving up on contended post");
    DomainError::StoreUnavailable(format!(
        "post {} kept changing after {} attempts",
        id, MAX_WRITE_ATTEMPTS
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InteractionKind, Topic};
    use crate::lifecycle::PostStatus;
    use crate::ports::{BaseRepository, ManualClock};
    use crate::query::TopicFilter;
    use async_trait::async_trait;
    use chrono::TimeDelta;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Vec-backed store that can be told to lose the next few races.
    #[derive(Default)]
    struct StubPosts {
        posts: Mutex<Vec<Post>>,
        conflicts_to_inject: AtomicU32,
    }

    impl StubPosts {
        fn stored(&self, id: Uuid) -> Option<Post> {
            self.posts.lock().unwrap().iter().find(|p| p.id == id).cloned()
        }
    }

    #[async_trait]
    impl BaseRepository<Post, Uuid> for StubPosts {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
            Ok(self.stored(id))
        }

        async fn insert(&self, post: Post) -> Result<Post, RepoError> {
            self.posts.lock().unwrap().push(post.clone());
            Ok(post)
        }
    }

    #[async_trait]
    impl PostRepository for StubPosts {
        async fn find_by_topic(
            &self,
            query: &TopicQuery,
            now: DateTime<Utc>,
        ) -> Result<Vec<Post>, RepoError> {
            let posts = self.posts.lock().unwrap();
            Ok(crate::query::select_posts(posts.iter().cloned(), query, now))
        }

        async fn replace_if_version(&self, mut post: Post) -> Result<Post, RepoError> {
            if self
                .conflicts_to_inject
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(RepoError::Conflict);
            }
            let mut posts = self.posts.lock().unwrap();
            let slot = posts
                .iter_mut()
                .find(|p| p.id == post.id)
                .ok_or(RepoError::NotFound)?;
            if slot.version != post.version {
                return Err(RepoError::Conflict);
            }
            post.version += 1;
            *slot = post.clone();
            Ok(post)
        }

        async fn delete_if_version(&self, id: Uuid, expected: u64) -> Result<(), RepoError> {
            let mut posts = self.posts.lock().unwrap();
            let index = posts
                .iter()
                .position(|p| p.id == id)
                .ok_or(RepoError::NotFound)?;
            if posts[index].version != expected {
                return Err(RepoError::Conflict);
            }
            posts.remove(index);
            Ok(())
        }
    }

    struct Fixture {
        service: PostService,
        store: Arc<StubPosts>,
        clock: Arc<ManualClock>,
        ana: Caller,
        ben: Caller,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(StubPosts::default());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        Fixture {
            service: PostService::new(store.clone(), clock.clone()),
            store,
            clock,
            ana: Caller::new(Uuid::new_v4(), "ana"),
            ben: Caller::new(Uuid::new_v4(), "ben"),
        }
    }

    fn draft(minutes: u32) -> NewPost {
        NewPost {
            title: "Rust 2024 edition".to_string(),
            text: "What changed?".to_string(),
            topics: vec![Topic::Tech],
            duration_minutes: minutes,
        }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let f = fixture();
        let created = f.service.create_post(&f.ana, draft(15)).await.unwrap();
        let fetched = f.service.get_post(created.id).await.unwrap();

        assert_eq!(fetched.title, "Rust 2024 edition");
        assert_eq!(fetched.text, "What changed?");
        assert_eq!(fetched.topics, vec![Topic::Tech]);
        assert_eq!((fetched.likes, fetched.dislikes, fetched.interest_score), (0, 0, 0));
        assert_eq!(
            (fetched.expiration_time - fetched.created_at).num_milliseconds(),
            15 * 60_000
        );
    }

    #[tokio::test]
    async fn test_get_unknown_post_is_not_found() {
        let f = fixture();
        let result = f.service.get_post(Uuid::new_v4()).await;
        assert!(matches!(result, Err(DomainError::NotFound { entity_type: "Post", .. })));
    }

    #[tokio::test]
    async fn test_zero_duration_post_rejects_like() {
        let f = fixture();
        let post = f.service.create_post(&f.ana, draft(0)).await.unwrap();

        let result = f.service.like(&f.ben, post.id).await;
        assert!(matches!(result, Err(DomainError::Expired)));
    }

    #[tokio::test]
    async fn test_like_then_self_like() {
        let f = fixture();
        let post = f.service.create_post(&f.ana, draft(10)).await.unwrap();

        let receipt = f.service.like(&f.ben, post.id).await.unwrap();
        assert_eq!(receipt.message, "ben liked ana's post");
        assert_eq!(receipt.post.likes, 1);
        assert_eq!(receipt.post.interest_score, 1);

        let result = f.service.like(&f.ana, post.id).await;
        assert!(matches!(result, Err(DomainError::SelfInteraction)));

        let stored = f.store.stored(post.id).unwrap();
        assert_eq!(stored.likes, 1);
        assert_eq!(stored.interest_score, 1);
        assert_eq!(stored.interactions.len(), 1);
    }

    #[tokio::test]
    async fn test_author_cannot_comment_on_own_post() {
        let f = fixture();
        let post = f.service.create_post(&f.ana, draft(10)).await.unwrap();

        let result = f.service.comment(&f.ana, post.id, "me again".to_string()).await;
        assert!(matches!(result, Err(DomainError::SelfInteraction)));
    }

    #[tokio::test]
    async fn test_comment_appends_ledger_only() {
        let f = fixture();
        let post = f.service.create_post(&f.ana, draft(10)).await.unwrap();

        let receipt = f
            .service
            .comment(&f.ben, post.id, "hi".to_string())
            .await
            .unwrap();

        let ledger = &receipt.post.interactions;
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].kind, InteractionKind::Comment);
        assert_eq!(ledger[0].text.as_deref(), Some("hi"));
        assert_eq!(
            (receipt.post.likes, receipt.post.dislikes, receipt.post.interest_score),
            (0, 0, 0)
        );
    }

    #[tokio::test]
    async fn test_repeated_likes_are_not_deduplicated() {
        let f = fixture();
        let post = f.service.create_post(&f.ana, draft(10)).await.unwrap();

        for _ in 0..3 {
            f.service.like(&f.ben, post.id).await.unwrap();
        }

        let stored = f.store.stored(post.id).unwrap();
        assert_eq!(stored.likes, 3);
        assert_eq!(stored.interest_score, 3);
        assert_eq!(stored.interactions.len(), 3);
        assert!(stored.interactions.iter().all(|i| i.actor_id == f.ben.id));
    }

    #[tokio::test]
    async fn test_score_matches_likes_plus_dislikes() {
        let f = fixture();
        let post = f.service.create_post(&f.ana, draft(10)).await.unwrap();
        let cid = Caller::new(Uuid::new_v4(), "cid");

        f.service.like(&f.ben, post.id).await.unwrap();
        f.service.dislike(&cid, post.id).await.unwrap();
        f.service.dislike(&f.ben, post.id).await.unwrap();
        let last = f.service.like(&cid, post.id).await.unwrap().post;

        assert_eq!(last.likes, 2);
        assert_eq!(last.dislikes, 2);
        assert_eq!(last.likes + last.dislikes, last.interest_score);
    }

    #[tokio::test]
    async fn test_expired_post_is_read_only() {
        let f = fixture();
        let post = f.service.create_post(&f.ana, draft(1)).await.unwrap();
        f.clock.advance(TimeDelta::minutes(1));

        assert!(matches!(f.service.like(&f.ben, post.id).await, Err(DomainError::Expired)));
        assert!(matches!(f.service.dislike(&f.ben, post.id).await, Err(DomainError::Expired)));
        assert!(matches!(
            f.service.comment(&f.ben, post.id, "late".to_string()).await,
            Err(DomainError::Expired)
        ));
        let changes = PostChanges {
            title: Some("edited".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            f.service.update_post(&f.ana, post.id, changes).await,
            Err(DomainError::Expired)
        ));
        assert!(matches!(
            f.service.delete_post(&f.ana, post.id).await,
            Err(DomainError::Expired)
        ));

        let read = f.service.get_post(post.id).await.unwrap();
        assert_eq!(read.status_at(f.service.now()), PostStatus::Expired);
        assert_eq!(read, post);
    }

    #[tokio::test]
    async fn test_non_owner_delete_leaves_post_in_place() {
        let f = fixture();
        let post = f.service.create_post(&f.ana, draft(10)).await.unwrap();

        let result = f.service.delete_post(&f.ben, post.id).await;
        assert!(matches!(result, Err(DomainError::NotOwner)));
        assert_eq!(f.store.stored(post.id), Some(post));
    }

    #[tokio::test]
    async fn test_owner_delete_removes_post() {
        let f = fixture();
        let post = f.service.create_post(&f.ana, draft(10)).await.unwrap();

        f.service.delete_post(&f.ana, post.id).await.unwrap();
        assert!(matches!(
            f.service.get_post(post.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_by_owner_and_non_owner() {
        let f = fixture();
        let post = f.service.create_post(&f.ana, draft(10)).await.unwrap();
        let changes = PostChanges {
            topics: Some(vec![Topic::Tech, Topic::Politics]),
            ..Default::default()
        };

        let result = f.service.update_post(&f.ben, post.id, changes.clone()).await;
        assert!(matches!(result, Err(DomainError::NotOwner)));

        let updated = f.service.update_post(&f.ana, post.id, changes).await.unwrap();
        assert_eq!(updated.topics, vec![Topic::Tech, Topic::Politics]);
        assert_eq!(updated.expiration_time, post.expiration_time);
        assert_eq!(updated.version, post.version + 1);
    }

    #[tokio::test]
    async fn test_empty_update_checks_post_before_fields() {
        let f = fixture();
        let post = f.service.create_post(&f.ana, draft(1)).await.unwrap();
        let empty = PostChanges::default();

        assert!(matches!(
            f.service.update_post(&f.ana, Uuid::new_v4(), empty.clone()).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            f.service.update_post(&f.ben, post.id, empty.clone()).await,
            Err(DomainError::NotOwner)
        ));
        assert!(matches!(
            f.service.update_post(&f.ana, post.id, empty.clone()).await,
            Err(DomainError::InvalidInput(_))
        ));

        f.clock.advance(TimeDelta::minutes(2));
        assert!(matches!(
            f.service.update_post(&f.ana, post.id, empty).await,
            Err(DomainError::Expired)
        ));
        assert_eq!(f.store.stored(post.id).unwrap().version, post.version);
    }

    #[tokio::test]
    async fn test_conflicting_write_is_retried() {
        let f = fixture();
        let post = f.service.create_post(&f.ana, draft(10)).await.unwrap();
        f.store.conflicts_to_inject.store(2, Ordering::SeqCst);

        let receipt = f.service.like(&f.ben, post.id).await.unwrap();
        assert_eq!(receipt.post.likes, 1);
        assert_eq!(receipt.post.interactions.len(), 1);
    }

    #[tokio::test]
    async fn test_endless_conflicts_surface_store_unavailable() {
        let f = fixture();
        let post = f.service.create_post(&f.ana, draft(10)).await.unwrap();
        f.store
            .conflicts_to_inject
            .store(MAX_WRITE_ATTEMPTS, Ordering::SeqCst);

        let result = f.service.like(&f.ben, post.id).await;
        assert!(matches!(result, Err(DomainError::StoreUnavailable(_))));
        assert_eq!(f.store.stored(post.id).unwrap().likes, 0);
    }

    #[tokio::test]
    async fn test_highest_interest_never_returns_expired() {
        let f = fixture();
        let short = f.service.create_post(&f.ana, draft(1)).await.unwrap();
        let long = f.service.create_post(&f.ana, draft(30)).await.unwrap();
        for _ in 0..3 {
            f.service.like(&f.ben, short.id).await.unwrap();
        }
        f.service.like(&f.ben, long.id).await.unwrap();

        f.clock.advance(TimeDelta::minutes(2));
        let top = f
            .service
            .list_by_topic(TopicQuery::new(Topic::Tech).highest_interest())
            .await
            .unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].post().id, long.id);

        let expired = f
            .service
            .list_by_topic(TopicQuery::new(Topic::Tech).with_filter(TopicFilter::Expired))
            .await
            .unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].post().id, short.id);
    }
}
