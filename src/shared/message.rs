//! Chat Message Data Structure
//!
//! Canonical message shape used by every consumer of the relay, plus the
//! normalizer that turns an arbitrary inbound payload into that shape.
//!
//! # Payload Tolerance
//!
//! The relay may deliver the same logical message with snake_case or
//! camelCase keys, and sometimes with the sender nested as an object. The
//! normalizer performs an ordered-fallback lookup per field so that the
//! tolerance stays explicit and in one place:
//!
//! | field           | keys tried                                      |
//! |-----------------|-------------------------------------------------|
//! | id              | `id`, `_id`                                     |
//! | sender_id       | `sender_id`, `senderId`, `sender.id`, `sender._id` |
//! | receiver_id     | `receiver_id`, `receiverId`, `receiver.id`, `receiver._id` |
//! | conversation_id | `conversation_id`, `conversationId`             |
//! | content         | `content`, `body`, `message`                    |
//! | created_at      | `created_at`, `createdAt`, `timestamp`          |
//!
//! # Usage
//!
//! ```rust
//! use draftio::shared::message::normalize_message;
//!
//! let msg = normalize_message(&serde_json::json!({"senderId": "u1", "content": "hi"}));
//! assert_eq!(msg.sender_id, "u1");
//! assert_eq!(msg.id, "");
//! ```

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const ID_KEYS: &[&str] = &["id", "_id"];
const SENDER_KEYS: &[&str] = &["sender_id", "senderId", "sender.id", "sender._id"];
const RECEIVER_KEYS: &[&str] = &["receiver_id", "receiverId", "receiver.id", "receiver._id"];
const CONVERSATION_KEYS: &[&str] = &["conversation_id", "conversationId"];
const CONTENT_KEYS: &[&str] = &["content", "body", "message"];
const CREATED_KEYS: &[&str] = &["created_at", "createdAt", "timestamp"];

/// A direct message between two users
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Server-assigned id; empty when the payload carried none
    pub id: String,
    /// User who sent the message
    pub sender_id: String,
    /// User the message was addressed to
    pub receiver_id: String,
    /// Server-side conversation key (may be empty)
    pub conversation_id: String,
    /// Message body text
    pub content: String,
    /// When the message was created
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new message stamped with the current time
    pub fn new(
        id: impl Into<String>,
        sender_id: impl Into<String>,
        receiver_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            sender_id: sender_id.into(),
            receiver_id: receiver_id.into(),
            conversation_id: String::new(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Set the conversation key
    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = conversation_id.into();
        self
    }

    /// Whether the payload carried a message id
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Normalize an inbound payload into a [`Message`].
///
/// Total over any JSON value: missing or malformed fields become empty
/// strings and an unreadable timestamp becomes the current time.
pub fn normalize_message(payload: &Value) -> Message {
    Message {
        id: lookup_string(payload, ID_KEYS),
        sender_id: lookup_string(payload, SENDER_KEYS),
        receiver_id: lookup_string(payload, RECEIVER_KEYS),
        conversation_id: lookup_string(payload, CONVERSATION_KEYS),
        content: lookup_string(payload, CONTENT_KEYS),
        created_at: lookup_timestamp(payload, CREATED_KEYS).unwrap_or_else(Utc::now),
    }
}

/// First key in `keys` that resolves to a scalar, rendered as a string.
///
/// Keys may contain one `.` to reach into a nested object.
pub fn lookup_string(payload: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| resolve(payload, key))
        .find_map(scalar_to_string)
        .unwrap_or_default()
}

/// First key in `keys` that resolves to a boolean.
///
/// The strings `"true"` and `"false"` are accepted too.
pub fn lookup_bool(payload: &Value, keys: &[&str]) -> Option<bool> {
    keys.iter()
        .filter_map(|key| resolve(payload, key))
        .find_map(|value| match value {
            Value::Bool(b) => Some(*b),
            Value::String(s) if s == "true" => Some(true),
            Value::String(s) if s == "false" => Some(false),
            _ => None,
        })
}

/// First key in `keys` that parses as a timestamp (RFC 3339 or Unix millis).
pub fn lookup_timestamp(payload: &Value, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter()
        .filter_map(|key| resolve(payload, key))
        .find_map(|value| match value {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Value::Number(n) => n
                .as_i64()
                .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
            _ => None,
        })
}

fn resolve<'a>(payload: &'a Value, key: &str) -> Option<&'a Value> {
    match key.split_once('.') {
        Some((outer, inner)) => payload.get(outer)?.get(inner),
        None => payload.get(key),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
