//! Domain-level error types.

use thiserror::Error;

use crate::authorizer::Denial;

/// Domain errors - business logic failures.
///
/// Everything except [`DomainError::StoreConflict`] is terminal: the engine
/// takes no corrective action and the caller decides whether to retry.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: String },

    #[error("Post has expired and no longer accepts changes")]
    Expired,

    #[error("Authors cannot interact with their own post")]
    SelfInteraction,

    #[error("Only the author of a post may change it")]
    NotOwner,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Concurrent write conflict")]
    StoreConflict,

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl DomainError {
    pub fn post_not_found(id: impl ToString) -> Self {
        DomainError::NotFound {
            entity_type: "Post",
            id: id.to_string(),
        }
    }
}

impl From<Denial> for DomainError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::Expired => DomainError::Expired,
            Denial::SelfInteraction => DomainError::SelfInteraction,
            Denial::NotOwner => DomainError::NotOwner,
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// The stored document changed since it was loaded.
    #[error("Version conflict")]
    Conflict,
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => DomainError::NotFound {
                entity_type: "Record",
                id: "unknown".to_string(),
            },
            RepoError::Constraint(msg) => DomainError::Duplicate(msg),
            RepoError::Conflict => DomainError::StoreConflict,
            RepoError::Connection(msg) | RepoError::Query(msg) => {
                DomainError::StoreUnavailable(msg)
            }
        }
    }
}
