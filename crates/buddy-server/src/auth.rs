//! Session tokens and the authentication layer
//!
//! Sessions are stateless HS256 JWTs issued at registration and login. The
//! middleware verifies the bearer token and stashes the authenticated user
//! in request extensions; handlers never read ambient session state.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{AppError, AppState};

/// Session lifetime
const TOKEN_TTL_HOURS: i64 = 24;

/// Authenticated user, inserted into request extensions by the middleware
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id
    sub: i64,
    username: String,
    iat: i64,
    exp: i64,
}

/// Issue a session token for a user
pub fn issue_token(secret: &str, user_id: i64, username: &str) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_with(e.into()))
}

fn verify_token(secret: &str, token: &str) -> Result<AuthUser, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(AuthUser {
        id: data.claims.sub,
        username: data.claims.username,
    })
}

/// Authentication middleware for the protected API routes
///
/// Expects `Authorization: Bearer <token>`; a missing, expired, or tampered
/// token gets a 401 without touching the handler.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "));

    let Some(token) = token else {
        warn!(path = %request.uri().path(), "Unauthorized request - no bearer token");
        return unauthorized();
    };

    match verify_token(&state.config.secret, token) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            warn!(path = %request.uri().path(), error = %e, "Unauthorized request - invalid token");
            unauthorized()
        }
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "Authentication required"
        })),
    )
        .into_response()
}
