//! Static API-key guard for the assistant routes

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::error::AppError;
use crate::AppState;

/// Bearer token from the `Authorization` header, if any
pub fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer ").or_else(|| auth.strip_prefix("bearer ")))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Reject requests whose bearer token is not a configured API key.
/// Does nothing when `auth.enabled` is false.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth = &state.settings.auth;
    if !auth.enabled {
        return Ok(next.run(request).await);
    }

    let Some(token) = bearer_token(&request) else {
        debug!(path = %request.uri().path(), "Missing bearer token");
        return Err(AppError::Unauthorized("Unauthorized".to_string()));
    };

    if !auth.api_keys.iter().any(|key| key == token) {
        debug!(path = %request.uri().path(), "Unknown API key");
        return Err(AppError::Unauthorized("Invalid or expired token".to_string()));
    }

    Ok(next.run(request).await)
}
