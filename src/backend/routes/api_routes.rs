/**
 * API Routes
 *
 * - `POST /api/notifications` - push a notification (bearer auth)
 * - `GET  /health`            - liveness and session count
 */

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::backend::notifications::handle_push_notification;
use crate::backend::server::state::AppState;

pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/notifications", post(handle_push_notification))
        .route("/health", get(health))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "sessions": state.hub.registry().len(),
    }))
}
