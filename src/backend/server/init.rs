/**
 * Server Initialization
 *
 * Builds the application state, the router, and the background reaper that
 * drops polling sessions whose client stopped polling.
 */

use axum::Router;
use tokio::time::Instant;

use crate::backend::routes::create_router;
use crate::backend::server::config::ServerConfig;
use crate::backend::server::state::AppState;

/// Create the Axum application. Must be called inside a tokio runtime.
pub async fn create_app(config: ServerConfig) -> Router<()> {
    tracing::info!("[Server] Initializing relay server");
    let state = AppState::new(config);
    spawn_reaper(state.clone());
    create_router(state)
}

/// Periodically close polling sessions idle past `ping_interval + ping_timeout`
fn spawn_reaper(state: AppState) {
    let period = state.config.ping_interval;
    let limit = state.config.session_idle_limit();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let idle = state.hub.reap_idle(limit, Instant::now());
            if !idle.is_empty() {
                tracing::debug!("[Server] Reaped {} idle relay sessions", idle.len());
            }
        }
    });
}
