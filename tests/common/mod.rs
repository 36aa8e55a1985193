//! Common test utilities and helpers
//!
//! - In-memory relay connector/transport
//! - Custom assertion macros

pub mod mock_relay;

pub use mock_relay::*;
