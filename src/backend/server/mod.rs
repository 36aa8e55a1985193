//! Server Module
//!
//! Initialization and shared state of the relay server.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs    - Module exports
//! ├── state.rs  - AppState
//! ├── config.rs - ServerConfig (environment)
//! └── init.rs   - create_app and the idle-session reaper
//! ```

pub mod config;
pub mod init;
pub mod state;

pub use config::ServerConfig;
pub use init::create_app;
pub use state::AppState;
