/**
 * Relay Routes
 *
 * - `POST /relay/handshake` - open a relay session
 * - `GET  /relay/poll`      - long-poll queued frames
 * - `POST /relay/poll`      - send one frame
 * - `GET  /relay/ws`        - upgrade the session to WebSocket
 */

use axum::{
    routing::{get, post},
    Router,
};

use crate::backend::relay::handshake::handle_handshake;
use crate::backend::relay::polling::{handle_poll, handle_poll_send};
use crate::backend::relay::ws::handle_ws_upgrade;
use crate::backend::server::state::AppState;

pub fn configure_relay_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/relay/handshake", post(handle_handshake))
        .route("/relay/poll", get(handle_poll).post(handle_poll_send))
        .route("/relay/ws", get(handle_ws_upgrade))
}
