/**
 * Router Configuration
 *
 * Relay routes first, then the API routes, then tracing and CORS layers.
 * Unknown paths fall back to a 404.
 */

use axum::{http::StatusCode, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::routes::relay_routes::configure_relay_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = configure_relay_routes(Router::new());
    let router = configure_api_routes(router);

    router
        .fallback(|| async { (StatusCode::NOT_FOUND, "404 Not Found") })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
