//! Shared Module
//!
//! Types shared between the relay client and the relay server: the canonical
//! message shape and its normalizer, the wire envelope and typed events,
//! notification records, configuration and error types.
//!
//! # Overview
//!
//! Everything here is platform-agnostic and serializable so that both sides
//! of the relay agree on one definition of each payload.

/// Message data structure and payload normalizer
pub mod message;

/// Relay wire envelope and typed events
pub mod event;

/// Notification records
pub mod notification;

/// Shared error types
pub mod error;

/// Relay configuration
pub mod config;

pub use config::{ConfigError, RelayConfig, RelayConfigBuilder};
pub use error::SharedError;
pub use event::{EventType, Frame, RelayEvent, TransportMode};
pub use message::{normalize_message, Message};
pub use notification::{Notification, NotificationType};
