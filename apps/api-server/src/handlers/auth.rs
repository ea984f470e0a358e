//! Registration and login handlers.

use actix_web::{HttpResponse, web};

use piazza_core::domain::User;
use piazza_shared::dto::{AuthResponse, LoginRequest, RegisterUserRequest, UserResponse};

use crate::middleware::auth::{AUTH_TOKEN_HEADER, Identity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/user/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let password_len = req.password.chars().count();
    if !(6..=1024).contains(&password_len) {
        return Err(AppError::BadRequest(
            "Password must be between 6 and 1024 characters".to_string(),
        ));
    }

    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let password_hash = state.passwords.hash(&req.password)?;
    let user = User::new(req.username, req.email, password_hash, state.posts.now())?;
    let saved = state.users.insert(user).await?;

    tracing::info!(user_id = %saved.id, "User registered");

    Ok(HttpResponse::Created().json(UserResponse {
        id: saved.id.to_string(),
        username: saved.username,
        email: Some(saved.email),
        created_at: Some(saved.created_at.to_rfc3339()),
    }))
}

/// POST /api/user/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Password mismatch");
        return Err(AppError::Unauthorized);
    }

    let token = state.tokens.generate_token(user.id, &user.username)?;

    Ok(HttpResponse::Ok()
        .insert_header((AUTH_TOKEN_HEADER, token.clone()))
        .json(AuthResponse {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in: state.tokens.expiration_seconds().max(0) as u64,
        }))
}

/// GET /api/user/me - Protected route
pub async fn me(identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(UserResponse {
        id: identity.user_id.to_string(),
        username: identity.name,
        email: None,
        created_at: None,
    }))
}
