//! Standardized API response types (RFC 7807 compliant for errors).

use serde::{Deserialize, Serialize};

/// Standard successful API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }

    /// A success that carries only a message, e.g. after a delete.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Problem type URIs for the post lifecycle refusals.
pub mod problem {
    pub const POST_EXPIRED: &str = "/problems/post-expired";
    pub const SELF_INTERACTION: &str = "/problems/self-interaction";
    pub const NOT_OWNER: &str = "/problems/not-owner";
    pub const WRITE_CONFLICT: &str = "/problems/write-conflict";
}

/// RFC 7807 Problem Details for HTTP APIs.
///
/// See: https://datatracker.ietf.org/doc/html/rfc7807
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type")]
    pub error_type: String,

    /// A short, human-readable summary of the problem type.
    pub title: String,

    /// The HTTP status code.
    pub status: u16,

    /// A human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn new(status: u16, title: impl Into<String>) -> Self {
        Self {
            error_type: "about:blank".to_string(),
            title: title.into(),
            status,
            detail: None,
        }
    }

    pub fn with_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = error_type.into();
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    // Common error constructors
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(400, "Bad Request").with_detail(detail)
    }

    pub fn unauthorized() -> Self {
        Self::new(401, "Unauthorized")
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(404, "Not Found").with_detail(detail)
    }

    pub fn internal_error() -> Self {
        Self::new(500, "Internal Server Error")
    }

    pub fn service_unavailable() -> Self {
        Self::new(503, "Service Unavailable")
            .with_detail("The post store is temporarily unavailable. Please retry.")
    }

    // Post lifecycle refusals
    pub fn post_expired() -> Self {
        Self::new(403, "Post Expired")
            .with_type(problem::POST_EXPIRED)
            .with_detail("This post has expired and is now read-only.")
    }

    pub fn self_interaction() -> Self {
        Self::new(403, "Self Interaction")
            .with_type(problem::SELF_INTERACTION)
            .with_detail("You cannot like, dislike or comment on your own post.")
    }

    pub fn not_owner() -> Self {
        Self::new(403, "Not Owner")
            .with_type(problem::NOT_OWNER)
            .with_detail("Only the author of this post can change or delete it.")
    }

    pub fn write_conflict() -> Self {
        Self::new(409, "Write Conflict").with_type(problem::WRITE_CONFLICT)
    }
}
