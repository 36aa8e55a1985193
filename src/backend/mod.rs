//! Backend Module
//!
//! The relay server. Only compiled with the `ssr` feature.
//!
//! # Architecture
//!
//! - **`server`** - ServerConfig, AppState, app creation and the idle reaper
//! - **`routes`** - Router assembly
//! - **`relay`** - Session registry, routing hub, transport endpoints
//! - **`notifications`** - Server-pushed notification endpoint
//! - **`auth`** - JWT verification and bearer extraction
//! - **`error`** - BackendError and its HTTP mapping
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs           - Module exports and documentation
//! ├── main.rs          - draftio-relay binary
//! ├── server/          - Initialization and state
//! ├── routes/          - Route configuration
//! ├── relay/           - Realtime relay
//! ├── notifications.rs - POST /api/notifications
//! ├── auth/            - Authentication
//! └── error/           - Error types
//! ```
//!
//! # State Management
//!
//! `AppState` holds the configuration and the relay hub. The hub's session
//! registry is an `Arc<SessionRegistry>` guarded by a `parking_lot::RwLock`;
//! every session owns an unbounded frame queue drained by exactly one
//! transport at a time.

pub mod auth;
pub mod error;
pub mod notifications;
pub mod relay;
pub mod routes;
pub mod server;

pub use error::BackendError;
pub use server::{create_app, AppState, ServerConfig};
