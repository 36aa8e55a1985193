//! Backend Error Module
//!
//! Error types returned by relay server handlers.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports
//! ├── types.rs      - BackendError and its status mapping
//! └── conversion.rs - IntoResponse
//! ```
//!
//! # HTTP Response Conversion
//!
//! `BackendError` implements Axum's `IntoResponse`, so handlers return it
//! directly. The body is `{"error": <message>, "status": <code>}`.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::BackendError;
