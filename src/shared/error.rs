//! Shared Error Types
//!
//! Errors that can occur on both sides of the relay: encoding frames,
//! validating payloads and rejecting frames that make no sense.
//!
//! # Usage
//!
//! ```rust
//! use draftio::shared::error::SharedError;
//!
//! let error = SharedError::validation("receiverId", "receiver is required");
//! assert!(error.to_string().contains("receiverId"));
//! ```
use thiserror::Error;

/// Shared error types that can occur in both client and server
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Payload validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Frame that is well-formed JSON but not acceptable here
    #[error("Frame error: {message}")]
    FrameError {
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new frame error
    pub fn frame(message: impl Into<String>) -> Self {
        Self::FrameError {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
