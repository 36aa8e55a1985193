//! Draft.IO - Realtime Relay Library
//!
//! Real-time chat and presence for Draft.IO: a relay client that keeps one
//! connection per signed-in session, the client-side state it drives
//! (messages, presence, typing, notifications), and the relay server the
//! client talks to.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between client and server
//!   - Wire frames and typed relay events
//!   - Message normalization, notification records
//!   - Relay configuration, error types
//!
//! - **`client`** - Realtime client
//!   - `RelayClient` with polling and WebSocket transports, fixed-delay
//!     bounded reconnect
//!   - Dispatcher, message store, presence and typing sets
//!   - Notification projector, query cache, toasts
//!   - Persisted session store
//!
//! - **`backend`** - Relay server (only compiled with `ssr` feature)
//!   - Axum routes for handshake, long-poll and WebSocket upgrade
//!   - Session registry, presence and message routing
//!   - Server-pushed notifications
//!
//! # Feature Flags
//!
//! - **`ssr`** - Enables the relay server (Axum, JWT, dotenv)
//!
//! # Usage
//!
//! ```rust,no_run
//! use draftio::client::config::Config;
//! use draftio::client::session::{Session, SessionStore};
//! use draftio::client::ClientApp;
//!
//! # async fn example() -> Result<(), draftio::client::ClientError> {
//! let sessions = SessionStore::load("/tmp/draftio/session.json");
//! let mut app = ClientApp::new(Config::new(), sessions);
//! let connection = app.login(Session::new("u1", "token"))?;
//! connection.send_message("u2", "hello").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! - **Server**: shared state is `Arc` + `parking_lot::RwLock`; each relay
//!   session has its own unbounded queue
//! - **Client**: one task per connection; events fan out over a
//!   `tokio::sync::broadcast` channel and are applied in order by the
//!   dispatcher

/// Shared types and data structures
pub mod shared;

/// Realtime client
pub mod client;

/// Relay server
#[cfg(feature = "ssr")]
pub mod backend;
