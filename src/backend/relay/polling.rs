/**
 * Long-Polling Transport
 *
 * - `GET /relay/poll?sid=` waits up to `poll_timeout` for queued frames and
 *   returns them as a JSON array (empty on timeout)
 * - `POST /relay/poll?sid=` accepts one client frame
 *
 * Unknown sessions get 404. Once a session has upgraded to WebSocket its
 * queue belongs to the socket and GET answers 409.
 */

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::backend::error::BackendError;
use crate::backend::relay::registry::RelaySession;
use crate::backend::server::state::AppState;
use crate::shared::Frame;

#[derive(Debug, Deserialize)]
pub struct SidQuery {
    pub sid: String,
}

pub(crate) fn lookup_session(state: &AppState, sid: &str) -> Result<Arc<RelaySession>, BackendError> {
    state
        .hub
        .registry()
        .get(sid)
        .ok_or_else(|| BackendError::not_found(format!("unknown relay session {}", sid)))
}

pub async fn handle_poll(
    State(state): State<AppState>,
    Query(query): Query<SidQuery>,
) -> Result<Json<Vec<Frame>>, BackendError> {
    let session = lookup_session(&state, &query.sid)?;
    if session.is_upgraded() {
        return Err(BackendError::conflict("session upgraded to websocket"));
    }
    session.touch();

    let frames = {
        let mut queue = session.queue().await;
        let mut frames = Vec::new();
        while let Ok(frame) = queue.try_recv() {
            frames.push(frame);
        }
        if frames.is_empty() {
            if let Ok(Some(frame)) =
                tokio::time::timeout(state.config.poll_timeout, queue.recv()).await
            {
                frames.push(frame);
                while let Ok(frame) = queue.try_recv() {
                    frames.push(frame);
                }
            }
        }
        frames
    };

    session.touch();
    Ok(Json(frames))
}

pub async fn handle_poll_send(
    State(state): State<AppState>,
    Query(query): Query<SidQuery>,
    Json(frame): Json<Frame>,
) -> Result<StatusCode, BackendError> {
    let session = lookup_session(&state, &query.sid)?;
    state.hub.handle_frame(&session, frame)?;
    Ok(StatusCode::NO_CONTENT)
}
