//! Route Configuration Module
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports
//! ├── router.rs       - Router assembly and middleware layers
//! ├── relay_routes.rs - Handshake, long-poll, WebSocket
//! └── api_routes.rs   - Notification push, health
//! ```

pub mod api_routes;
pub mod relay_routes;
pub mod router;

pub use router::create_router;
