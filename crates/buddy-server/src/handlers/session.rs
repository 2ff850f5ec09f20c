//! Registration, login, and session handlers

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{issue_token, AuthUser};
use crate::{AppError, AppState, SuccessResponse};
use buddy_core::models::User;

/// Request body for registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response carrying a fresh session token
#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub username: String,
}

/// POST /api/register - Create an account and start a session
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = state
        .db
        .create_user(&req.username, &req.email, &req.password)?;
    let token = issue_token(&state.config.secret, user.id, &user.username)?;

    info!(username = %user.username, "User registered");

    Ok(Json(TokenResponse {
        token,
        username: user.username,
    }))
}

/// POST /api/login - Check credentials and start a session
///
/// Unknown username and wrong password get the same generic 401.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = state
        .db
        .verify_credentials(&req.username, &req.password)?
        .ok_or_else(|| AppError::unauthorized("Invalid username or password"))?;

    let token = issue_token(&state.config.secret, user.id, &user.username)?;

    Ok(Json(TokenResponse {
        token,
        username: user.username,
    }))
}

/// POST /api/logout - End the session
///
/// Sessions are stateless; the client discards the token.
pub async fn logout(Extension(user): Extension<AuthUser>) -> Json<SuccessResponse> {
    info!(username = %user.username, "User logged out");
    Json(SuccessResponse { success: true })
}

/// GET /api/me - The authenticated user's profile
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<User>, AppError> {
    let user = state
        .db
        .get_user(user.id)?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(user))
}
