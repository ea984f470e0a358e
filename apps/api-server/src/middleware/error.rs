//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use piazza_core::DomainError;
use piazza_core::ports::AuthError;
use piazza_shared::ErrorResponse;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Post expired")]
    Expired,
    #[error("Self interaction")]
    SelfInteraction,
    #[error("Not owner")]
    NotOwner,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Write conflict")]
    WriteConflict,
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Expired | AppError::SelfInteraction | AppError::NotOwner => {
                StatusCode::FORBIDDEN
            }
            AppError::Conflict(_) | AppError::WriteConflict => StatusCode::CONFLICT,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Unauthorized => ErrorResponse::unauthorized(),
            AppError::Expired => ErrorResponse::post_expired(),
            AppError::SelfInteraction => ErrorResponse::self_interaction(),
            AppError::NotOwner => ErrorResponse::not_owner(),
            AppError::Conflict(detail) => ErrorResponse::new(409, "Conflict").with_detail(detail),
            AppError::WriteConflict => ErrorResponse::write_conflict(),
            AppError::Unavailable(detail) => {
                tracing::error!("Store unavailable: {}", detail);
                ErrorResponse::service_unavailable()
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{} with id {} not found", entity_type, id))
            }
            DomainError::Expired => AppError::Expired,
            DomainError::SelfInteraction => AppError::SelfInteraction,
            DomainError::NotOwner => AppError::NotOwner,
            DomainError::InvalidInput(msg) => AppError::BadRequest(msg),
            DomainError::Duplicate(msg) => AppError::Conflict(msg),
            DomainError::Unauthorized => AppError::Unauthorized,
            DomainError::StoreConflict => AppError::WriteConflict,
            DomainError::StoreUnavailable(msg) => AppError::Unavailable(msg),
        }
    }
}

impl From<piazza_core::RepoError> for AppError {
    fn from(err: piazza_core::RepoError) -> Self {
        DomainError::from(err).into()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::Unauthorized,
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_refusals_are_forbidden() {
        for err in [
            DomainError::Expired,
            DomainError::SelfInteraction,
            DomainError::NotOwner,
        ] {
            assert_eq!(AppError::from(err).status_code(), StatusCode::FORBIDDEN);
        }
    }

    #[test]
    fn test_store_errors_map_to_retryable_statuses() {
        assert_eq!(
            AppError::from(DomainError::StoreConflict).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(DomainError::StoreUnavailable("down".to_string())).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_not_found_names_the_entity() {
        let err = AppError::from(DomainError::post_not_found("abc"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(err.to_string().contains("Post with id abc"));
    }
}
