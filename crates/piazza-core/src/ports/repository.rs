use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Post, User};
use crate::error::RepoError;
use crate::query::TopicQuery;

/// Operations every document store offers.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity. Fails with `Constraint` if it already exists.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository.
///
/// Writes are compare-and-swap on [`Post::version`]: a write only lands when
/// the stored version still equals the one the caller loaded, otherwise it
/// fails with [`RepoError::Conflict`] and nothing changes.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Posts `query` selects at `now`, in listing order and at most
    /// `query.limit()` of them. Status filtering, ranking and the cap are
    /// applied by the store.
    async fn find_by_topic(
        &self,
        query: &TopicQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<Post>, RepoError>;

    /// Replace the stored post if its version is still `post.version`.
    /// Returns the stored post with its version bumped by one.
    async fn replace_if_version(&self, post: Post) -> Result<Post, RepoError>;

    /// Delete the post if its version is still `expected_version`.
    /// Fails with `NotFound` if the post is gone.
    async fn delete_if_version(&self, id: Uuid, expected_version: u64) -> Result<(), RepoError>;
}
