//! Post entity for SeaORM.
//!
//! A post is stored as one row; its topics and interaction ledger are
//! embedded as JSONB so a single-row write covers the whole document.

use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};

use piazza_core::domain::{Interaction, Topic};
use piazza_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub topics: Json,
    pub created_at: DateTimeWithTimeZone,
    pub duration_minutes: i64,
    pub expiration_time: DateTimeWithTimeZone,
    pub likes: i64,
    pub dislikes: i64,
    pub interest_score: i64,
    #[sea_orm(column_type = "JsonBinary")]
    pub interactions: Json,
    pub version: i64,
    /// Insertion sequence assigned by the database; orders posts created
    /// within the same instant.
    pub seq: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub(crate) fn to_db_int(field: &str, value: u64) -> Result<i64, RepoError> {
    i64::try_from(value).map_err(|_| RepoError::Query(format!("{} out of range: {}", field, value)))
}

pub(crate) fn from_db_int(field: &str, value: i64) -> Result<u64, RepoError> {
    u64::try_from(value).map_err(|_| RepoError::Query(format!("negative {} in row: {}", field, value)))
}

fn corrupt(field: &str, err: serde_json::Error) -> RepoError {
    RepoError::Query(format!("Malformed {} column: {}", field, err))
}

/// Conversion from SeaORM Model to Domain Post.
impl TryFrom<Model> for piazza_core::domain::Post {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let topics: Vec<Topic> =
            serde_json::from_value(model.topics).map_err(|e| corrupt("topics", e))?;
        let interactions: Vec<Interaction> =
            serde_json::from_value(model.interactions).map_err(|e| corrupt("interactions", e))?;
        let duration_minutes = u32::try_from(model.duration_minutes).map_err(|_| {
            RepoError::Query(format!("duration out of range: {}", model.duration_minutes))
        })?;

        Ok(Self {
            id: model.id,
            author_id: model.author_id,
            author_name: model.author_name,
            title: model.title,
            text: model.text,
            topics,
            created_at: model.created_at.into(),
            duration_minutes,
            expiration_time: model.expiration_time.into(),
            likes: from_db_int("likes", model.likes)?,
            dislikes: from_db_int("dislikes", model.dislikes)?,
            interest_score: from_db_int("interest_score", model.interest_score)?,
            interactions,
            version: from_db_int("version", model.version)?,
        })
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl TryFrom<piazza_core::domain::Post> for ActiveModel {
    type Error = RepoError;

    fn try_from(post: piazza_core::domain::Post) -> Result<Self, Self::Error> {
        let topics = serde_json::to_value(&post.topics).map_err(|e| corrupt("topics", e))?;
        let interactions =
            serde_json::to_value(&post.interactions).map_err(|e| corrupt("interactions", e))?;

        Ok(Self {
            id: Set(post.id),
            author_id: Set(post.author_id),
            author_name: Set(post.author_name),
            title: Set(post.title),
            text: Set(post.text),
            topics: Set(topics),
            created_at: Set(post.created_at.into()),
            duration_minutes: Set(i64::from(post.duration_minutes)),
            expiration_time: Set(post.expiration_time.into()),
            likes: Set(to_db_int("likes", post.likes)?),
            dislikes: Set(to_db_int("dislikes", post.dislikes)?),
            interest_score: Set(to_db_int("interest_score", post.interest_score)?),
            interactions: Set(interactions),
            version: Set(to_db_int("version", post.version)?),
            seq: NotSet,
        })
    }
}
