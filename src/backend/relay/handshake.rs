/**
 * Relay Handshake
 *
 * `POST /relay/handshake` with `{"token": <jwt>}` (or an `Authorization:
 * Bearer` header) opens a relay session for the token's subject.
 */

use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};

use crate::backend::auth::bearer::{authenticate, bearer_token};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct HandshakeRequest {
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeResponse {
    pub sid: String,
    pub upgrades: Vec<String>,
    /// Milliseconds
    pub ping_interval: u64,
    /// Milliseconds
    pub ping_timeout: u64,
}

pub async fn handle_handshake(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<HandshakeRequest>,
) -> Result<Json<HandshakeResponse>, BackendError> {
    let token = if request.token.is_empty() {
        bearer_token(&headers).unwrap_or_default()
    } else {
        request.token.as_str()
    };
    if token.is_empty() {
        return Err(BackendError::unauthorized("missing token"));
    }

    let user = authenticate(token, &state.config.jwt_secret)?;
    let session = state.hub.open_session(&user.user_id);
    tracing::info!("[Relay] Handshake for {} -> {}", user.user_id, session.sid);

    Ok(Json(HandshakeResponse {
        sid: session.sid.clone(),
        upgrades: vec!["websocket".to_string()],
        ping_interval: state.config.ping_interval.as_millis() as u64,
        ping_timeout: state.config.ping_timeout.as_millis() as u64,
    }))
}
