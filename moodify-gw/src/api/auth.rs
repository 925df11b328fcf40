//! Session authentication: middleware plus the /auth proxy routes
//!
//! The session credential arrives either as a bearer token or as a
//! `session` cookie. The middleware resolves it to a `User` via the
//! Identity Store and attaches the user as a request extension for the
//! handlers.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use axum::Json;

use moodify_common::api::{LoginRequest, MessageResponse, RegisterRequest, SessionResponse};
use moodify_common::models::SessionToken;
use moodify_common::Error;

use crate::AppState;

use super::ApiError;

/// Pull the session credential from `Authorization: Bearer` or the
/// `session` cookie
pub fn extract_token(headers: &HeaderMap) -> Option<SessionToken> {
    if let Some(value) = headers.get(axum::http::header::AUTHORIZATION) {
        if let Ok(text) = value.to_str() {
            if let Some(token) = text.strip_prefix("Bearer ") {
                return Some(SessionToken(token.trim().to_string()));
            }
        }
    }

    let cookies = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        pair.trim()
            .strip_prefix("session=")
            .map(|v| SessionToken(v.to_string()))
    })
}

/// Authentication middleware for everything under /api.
///
/// Returns 401 with a JSON error body when the credential is missing or
/// the Identity Store rejects it.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers())
        .ok_or_else(|| Error::Unauthorized("missing session credential".to_string()))?;

    let user = state.identity.verify(&token).await?;
    tracing::debug!(user_id = %user.id, "Authenticated request");

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    if body.email.trim().is_empty() || body.password.is_empty() || body.username.trim().is_empty() {
        return Err(Error::Validation("email, password, and username are required".to_string()).into());
    }

    let (user, token) = state
        .identity
        .register(&body.email, &body.password, &body.username)
        .await?;
    Ok(Json(SessionResponse {
        user,
        token: token.0,
    }))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let (user, token) = state.identity.login(&body.email, &body.password).await?;
    Ok(Json(SessionResponse {
        user,
        token: token.0,
    }))
}

/// POST /auth/logout
///
/// No-op without a credential, mirroring a cookie delete.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    if let Some(token) = extract_token(&headers) {
        state.identity.logout(&token).await?;
    }
    Ok(Json(MessageResponse {
        message: "logged out".to_string(),
    }))
}
