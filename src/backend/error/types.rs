/**
 * Backend Error Types
 *
 * Errors raised while serving relay and notification requests. Each variant
 * maps to one HTTP status:
 *
 * - `HandlerError` - carries its own status (bad request bodies, etc.)
 * - `Unauthorized` - missing or invalid bearer token
 * - `NotFound` - unknown relay session
 * - `Conflict` - long-poll on a session that moved to WebSocket
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::SharedError;

/// Backend-specific error types
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error with an explicit status
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Bearer token missing, malformed or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Unknown relay session id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request conflicts with the session's transport
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    SharedError(#[from] SharedError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::SharedError(err) => match err {
                SharedError::SerializationError { .. } => StatusCode::BAD_REQUEST,
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
                SharedError::FrameError { .. } => StatusCode::BAD_REQUEST,
            },
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the response body
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::Unauthorized(message) | Self::NotFound(message) | Self::Conflict(message) => {
                message.clone()
            }
            Self::SharedError(err) => err.to_string(),
            Self::SerializationError(err) => err.to_string(),
        }
    }
}
