/**
 * Bearer Authentication
 *
 * Extracts and verifies the JWT from the `Authorization` header. Handlers
 * that take [`AuthUser`] reject unauthenticated requests with 401.
 */

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::backend::auth::sessions::verify_token;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Authenticated caller
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Verify `token` and return the user it belongs to
pub fn authenticate(token: &str, secret: &str) -> Result<AuthUser, BackendError> {
    let claims = verify_token(token, secret).map_err(|e| {
        tracing::warn!("[Auth] Invalid token: {}", e);
        BackendError::unauthorized("invalid or expired token")
    })?;
    if claims.sub.is_empty() {
        return Err(BackendError::unauthorized("token has no subject"));
    }
    Ok(AuthUser {
        user_id: claims.sub,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            tracing::warn!("[Auth] Missing Authorization header");
            BackendError::unauthorized("missing bearer token")
        })?;
        authenticate(token, &state.config.jwt_secret)
    }
}
