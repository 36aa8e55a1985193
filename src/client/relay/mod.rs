//! Presence/Message Relay Client
//!
//! [`RelayClient`] is the single service that owns the relay connection of
//! the signed-in session. It is created once and handed to every consumer
//! (dispatcher, UI, send paths) as an `Arc`, so there is no global holder and
//! at most one live [`Connection`] exists per session.
//!
//! # Module Structure
//!
//! ```text
//! relay/
//! ├── mod.rs        - RelayClient (connect / disconnect / current)
//! ├── connection.rs - Connection handle and its background task
//! ├── transport.rs  - Transport/Connector seams, polling + WebSocket
//! └── retry.rs      - Fixed-delay bounded reconnect policy
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use draftio::client::config::Config;
//! use draftio::client::relay::{HttpConnector, RelayClient};
//!
//! # async fn example() -> Result<(), draftio::client::error::ClientError> {
//! let config = Config::new();
//! let relay = RelayClient::new(Arc::new(HttpConnector::new(config.clone())), config.relay());
//! let connection = relay.connect(Some("bearer-token"))?;
//! let mut events = connection.subscribe();
//! while let Ok(event) = events.recv().await {
//!     println!("{:?}", event);
//! }
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod retry;
pub mod transport;

pub use connection::{Connection, ConnectionState};
pub use retry::ReconnectPolicy;
pub use transport::{Connector, Handshake, HttpConnector, Transport};

use parking_lot::Mutex;
use std::sync::Arc;

use crate::client::error::ClientError;
use crate::shared::RelayConfig;

/// Owner of the session's relay connection
pub struct RelayClient {
    connector: Arc<dyn Connector>,
    policy: ReconnectPolicy,
    current: Mutex<Option<Arc<Connection>>>,
}

impl std::fmt::Debug for RelayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayClient")
            .field("policy", &self.policy)
            .field("current", &self.current.lock().as_ref().map(|c| c.id()))
            .finish()
    }
}

impl RelayClient {
    pub fn new(connector: Arc<dyn Connector>, config: &RelayConfig) -> Self {
        Self::with_policy(connector, ReconnectPolicy::from_config(config))
    }

    pub fn with_policy(connector: Arc<dyn Connector>, policy: ReconnectPolicy) -> Self {
        Self {
            connector,
            policy,
            current: Mutex::new(None),
        }
    }

    /// Connect the session authenticated by `token`.
    ///
    /// - No token: skipped, nothing is created, [`ClientError::MissingToken`].
    /// - A live connection for the same token: returned unchanged.
    /// - Otherwise any previous connection is torn down and a new one started.
    ///
    /// Must be called inside a tokio runtime.
    pub fn connect(&self, token: Option<&str>) -> Result<Arc<Connection>, ClientError> {
        let token = match token {
            Some(token) if !token.is_empty() => token,
            _ => {
                tracing::debug!("[RELAY] No session token, skipping connect");
                return Err(ClientError::MissingToken);
            }
        };

        let mut current = self.current.lock();
        if let Some(existing) = current.as_ref() {
            if existing.token() == token && existing.is_live() {
                tracing::debug!("[RELAY] Reusing live connection {}", existing.id());
                return Ok(Arc::clone(existing));
            }
            tracing::info!("[RELAY] Replacing connection {}", existing.id());
            existing.shutdown();
        }

        let connection = Arc::new(Connection::spawn(
            Arc::clone(&self.connector),
            token.to_string(),
            self.policy,
        ));
        *current = Some(Arc::clone(&connection));
        Ok(connection)
    }

    /// Tear down the connection, if any. Idempotent.
    pub fn disconnect(&self) {
        if let Some(connection) = self.current.lock().take() {
            tracing::info!("[RELAY] Disconnecting {}", connection.id());
            connection.shutdown();
        }
    }

    /// The held connection, live or not
    pub fn current(&self) -> Option<Arc<Connection>> {
        self.current.lock().clone()
    }

    pub fn policy(&self) -> ReconnectPolicy {
        self.policy
    }
}

impl Drop for RelayClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}
