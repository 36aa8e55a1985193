//! Draft.IO Client
//!
//! Realtime side of the client application: the relay connection, the state
//! it drives, and the persisted session it authenticates with.
//!
//! # Module Structure
//!
//! ```text
//! client/
//! ├── app.rs           - ClientApp: start / login / logout wiring
//! ├── config.rs        - Endpoint URLs derived from RelayConfig
//! ├── dispatcher.rs    - RealtimeState and the in-order event loop
//! ├── error.rs         - ClientError
//! ├── session.rs       - Persisted session + theme
//! ├── messaging/       - Message store, presence, typing
//! ├── notifications/   - Query cache, toasts, projector
//! └── relay/           - RelayClient, connection task, transports
//! ```

pub mod app;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod messaging;
pub mod notifications;
pub mod relay;
pub mod session;

pub use app::ClientApp;
pub use dispatcher::{run_dispatch, ConnectionStatus, RealtimeState};
pub use error::ClientError;
pub use relay::{Connection, ConnectionState, RelayClient};
