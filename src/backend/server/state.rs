/**
 * Application State
 *
 * Shared by every handler through Axum's `State` extractor. Cloning is cheap:
 * the configuration and the session registry sit behind `Arc`.
 */

use std::sync::Arc;

use crate::backend::relay::{RelayHub, SessionRegistry};
use crate::backend::server::config::ServerConfig;

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub hub: RelayHub,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            hub: RelayHub::new(Arc::new(SessionRegistry::new())),
        }
    }
}
