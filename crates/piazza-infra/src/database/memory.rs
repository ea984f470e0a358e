//! In-memory stores - used when no database is configured.
//!
//! Data is lost on process restart. Every check-and-write runs under a single
//! write lock, which gives the same compare-and-swap semantics as the
//! PostgreSQL store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use piazza_core::domain::{Post, User};
use piazza_core::error::RepoError;
use piazza_core::ports::{BaseRepository, PostRepository, UserRepository};
use piazza_core::query::{self, TopicQuery};

/// Posts kept in creation order.
pub struct InMemoryPostRepository {
    posts: RwLock<Vec<Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        if posts.iter().any(|p| p.id == post.id) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        posts.push(post.clone());
        Ok(post)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_topic(
        &self,
        query: &TopicQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<Post>, RepoError> {
        let posts = self.posts.read().await;
        let on_topic = posts.iter().filter(|p| p.has_topic(query.topic)).cloned();
        Ok(query::select_posts(on_topic, query, now))
    }

    async fn replace_if_version(&self, mut post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
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

    async fn delete_if_version(&self, id: Uuid, expected_version: u64) -> Result<(), RepoError> {
        let mut posts = self.posts.write().await;
        let index = posts
            .iter()
            .position(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;

        if posts[index].version != expected_version {
            return Err(RepoError::Conflict);
        }

        // remove, not swap_remove: listings rely on creation order
        posts.remove(index);
        Ok(())
    }
}

/// Users keyed by id, with email uniqueness enforced on insert.
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) || users.values().any(|u| u.email == user.email) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }
}
