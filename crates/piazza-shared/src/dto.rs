//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response containing a user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Request to publish a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub text: String,
    pub topics: Vec<String>,
    /// Minutes the post stays open for interactions.
    #[serde(alias = "duration")]
    pub duration_minutes: u32,
}

/// Partial edit of a post; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

/// Query string of a topic listing: `?filter=live&interest=highest`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicListQuery {
    pub filter: Option<String>,
    pub interest: Option<String>,
}

/// One entry of a post's interaction ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionView {
    pub time: String,
    pub kind: String,
    pub actor_id: String,
    pub actor_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub remaining_at_time: String,
}

/// A post as seen by clients. `status` is computed when the response is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub title: String,
    pub text: String,
    pub topics: Vec<String>,
    pub created_at: String,
    pub duration_minutes: u32,
    pub expiration_time: String,
    pub status: String,
    pub likes: u64,
    pub dislikes: u64,
    pub interest_score: u64,
    /// Omitted in summary views.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactions: Option<Vec<InteractionView>>,
}

/// Confirmation of a like, dislike or comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionResponse {
    pub message: String,
    pub post: PostResponse,
}
