//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use piazza_core::domain::{Post, User};
use piazza_core::error::RepoError;
use piazza_core::ports::{PostRepository, UserRepository};
use piazza_core::query::{InterestOrder, TopicFilter, TopicQuery};

use super::entity::post::{self, Entity as PostEntity, to_db_int};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// Mask an email for logging, e.g. `o***@example.com`.
fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at_pos) => {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = match local.chars().next() {
                Some(first) if local.len() > 1 => format!("{}***", first),
                _ => "***".to_string(),
            };
            format!("{}{}", masked_local, domain)
        }
        None => "***".to_string(),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        result.map(User::try_from).transpose()
    }
}

impl PostgresPostRepository {
    /// Tell a stale write apart from a missing row after zero rows matched.
    async fn missed_write(&self, id: Uuid) -> RepoError {
        match PostEntity::find_by_id(id).one(&self.db).await {
            Ok(Some(_)) => RepoError::Conflict,
            Ok(None) => RepoError::NotFound,
            Err(e) => query_error(e),
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_topic(
        &self,
        query: &TopicQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<Post>, RepoError> {
        let wanted = serde_json::Value::Array(vec![serde_json::Value::String(
            query.topic.as_str().to_string(),
        )]);
        let on_topic = PostEntity::find().filter(Expr::cust_with_values("topics @> ?", [wanted]));

        // live means now < expiration_time
        let select = match query.interest {
            Some(InterestOrder::Highest) => on_topic
                .filter(post::Column::ExpirationTime.gt(now))
                .order_by_desc(post::Column::InterestScore),
            None => match query.filter {
                TopicFilter::All => on_topic,
                TopicFilter::Live => on_topic.filter(post::Column::ExpirationTime.gt(now)),
                TopicFilter::Expired => on_topic.filter(post::Column::ExpirationTime.lte(now)),
            },
        };

        let rows = select
            .order_by_asc(post::Column::CreatedAt)
            .order_by_asc(post::Column::Seq)
            .limit(query.limit() as u64)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        tracing::debug!(topic = %query.topic, rows = rows.len(), "Loaded topic listing");
        rows.into_iter().map(Post::try_from).collect()
    }

    async fn replace_if_version(&self, mut post: Post) -> Result<Post, RepoError> {
        let id = post.id;
        let expected = to_db_int("version", post.version)?;
        post.version += 1;

        let active: post::ActiveModel = post.clone().try_into()?;
        let result = PostEntity::update_many()
            .set(active)
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::Version.eq(expected))
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        if result.rows_affected == 0 {
            return Err(self.missed_write(id).await);
        }
        Ok(post)
    }

    async fn delete_if_version(&self, id: Uuid, expected_version: u64) -> Result<(), RepoError> {
        let expected = to_db_int("version", expected_version)?;
        let result = PostEntity::delete_many()
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::Version.eq(expected))
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        if result.rows_affected == 0 {
            return Err(self.missed_write(id).await);
        }
        Ok(())
    }
}
