//! Relay Module
//!
//! Server side of the realtime relay: session registry, routing hub, and the
//! three transport endpoints (handshake, long-poll, WebSocket).
//!
//! # Module Structure
//!
//! ```text
//! relay/
//! ├── mod.rs       - Module exports
//! ├── registry.rs  - Sessions, per-session queues, per-user index
//! ├── hub.rs       - Message/typing routing and presence
//! ├── handshake.rs - POST /relay/handshake
//! ├── polling.rs   - GET/POST /relay/poll
//! └── ws.rs        - GET /relay/ws
//! ```

pub mod handshake;
pub mod hub;
pub mod polling;
pub mod registry;
pub mod ws;

pub use hub::{conversation_id, RelayHub};
pub use registry::{RelaySession, SessionRegistry};
