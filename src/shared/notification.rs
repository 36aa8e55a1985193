//! Notification Records
//!
//! Notifications are either synthesized on the client when a message lands in
//! an unfocused conversation, or pushed by the server for social activity
//! (likes, comments, follows).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::message::{lookup_bool, lookup_string, lookup_timestamp};

/// Kind of activity a notification refers to.
///
/// On the wire this is always a plain string, so kinds this build does not
/// know survive a round trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(from = "String", into = "String")]
pub enum NotificationType {
    /// Direct message
    #[default]
    Message,
    /// Someone liked a post
    Like,
    /// Someone commented on a post
    Comment,
    /// Someone followed the user
    Follow,
    /// Anything the client does not know about yet
    Other(String),
}

impl NotificationType {
    /// Parse a wire name; unknown names are kept verbatim
    pub fn parse(name: &str) -> Self {
        match name {
            "message" => Self::Message,
            "like" => Self::Like,
            "comment" => Self::Comment,
            "follow" => Self::Follow,
            other => Self::Other(other.to_string()),
        }
    }

    /// Wire name
    pub fn as_str(&self) -> &str {
        match self {
            Self::Message => "message",
            Self::Like => "like",
            Self::Comment => "comment",
            Self::Follow => "follow",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for NotificationType {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl From<NotificationType> for String {
    fn from(kind: NotificationType) -> Self {
        match kind {
            NotificationType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// A single entry of the notification cache
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    /// Dedup key
    pub id: String,
    /// User the notification is for
    pub recipient_id: String,
    /// Activity kind
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    /// Where clicking the notification navigates to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Read a server-pushed notification with the same tolerance as messages.
    ///
    /// Returns `None` when the payload has no id, since an id-less entry
    /// could never be deduplicated.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let id = lookup_string(payload, &["id", "_id"]);
        if id.is_empty() {
            return None;
        }
        let link = lookup_string(payload, &["link"]);
        Some(Self {
            id,
            recipient_id: lookup_string(payload, &["recipient_id", "recipientId", "userId"]),
            kind: NotificationType::parse(&lookup_string(payload, &["type", "kind"])),
            title: lookup_string(payload, &["title"]),
            message: lookup_string(payload, &["message", "body"]),
            link: (!link.is_empty()).then_some(link),
            read: lookup_bool(payload, &["read", "isRead"]).unwrap_or(false),
            created_at: lookup_timestamp(payload, &["created_at", "createdAt"])
                .unwrap_or_else(Utc::now),
        })
    }
}
