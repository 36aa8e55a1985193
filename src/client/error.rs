//! Client Error Types
//!
//! Everything the relay client can fail with. Transport failures are not
//! fatal to the application: the connection task reports them as
//! `ConnectionError` events and lets the reconnect policy decide.

use thiserror::Error;

use crate::shared::{ConfigError, SharedError};

/// Relay client errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// No session token; the connection attempt was skipped
    #[error("not authenticated: no session token")]
    MissingToken,

    /// The server refused the handshake
    #[error("handshake rejected ({status}): {message}")]
    HandshakeRejected {
        /// HTTP status returned by the handshake endpoint
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// WebSocket transport error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The transport stopped delivering frames
    #[error("transport closed: {0}")]
    TransportClosed(String),

    /// Outbound frame issued on a connection that has been torn down
    #[error("relay connection is not active")]
    NotConnected,

    /// Local state file error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Shared(#[from] SharedError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Shared(err.into())
    }
}

impl ClientError {
    /// Create a handshake rejection
    pub fn handshake(status: u16, message: impl Into<String>) -> Self {
        Self::HandshakeRejected {
            status,
            message: message.into(),
        }
    }
}
