use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// User entity - someone who can sign in and publish posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a generated ID.
    ///
    /// The password must already be hashed; only the name and email are
    /// checked here.
    pub fn new(
        username: String,
        email: String,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let name_len = username.chars().count();
        if !(3..=256).contains(&name_len) {
            return Err(DomainError::InvalidInput(
                "Username must be between 3 and 256 characters".to_string(),
            ));
        }

        let email_len = email.chars().count();
        if !(6..=256).contains(&email_len) || !email.contains('@') {
            return Err(DomainError::InvalidInput(
                "Invalid email address".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            created_at: now,
        })
    }
}
