//! Notification Projector
//!
//! Turns inbound messages and server-pushed notifications into entries of the
//! cached notification list plus a toast. Messages for the conversation the
//! user is currently looking at are not projected.

use chrono::Utc;
use tokio::time::Instant;

use super::cache::{QueryCache, NOTIFICATIONS_KEY};
use super::toast::ToastQueue;
use crate::shared::{Message, Notification, NotificationType};

/// Longest body shown before truncation
pub const MAX_BODY_CHARS: usize = 80;
/// Appended to truncated bodies
pub const ELLIPSIS: &str = "...";
/// Title of message notifications
pub const MESSAGE_TITLE: &str = "New message";

/// Cut `body` to [`MAX_BODY_CHARS`] characters plus [`ELLIPSIS`] when longer
pub fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_BODY_CHARS) {
        Some((cut, _)) => format!("{}{}", &body[..cut], ELLIPSIS),
        None => body.to_string(),
    }
}

/// Notification id for an inbound message
pub fn notification_id(message: &Message) -> String {
    if message.has_id() {
        format!("msg-{}", message.id)
    } else {
        format!("msg-{}", Utc::now().timestamp_millis())
    }
}

/// Prepend `entry` unless an entry with the same id exists
pub fn merge_notification(existing: &[Notification], entry: Notification) -> Vec<Notification> {
    if existing.iter().any(|n| n.id == entry.id) {
        return existing.to_vec();
    }
    let mut merged = Vec::with_capacity(existing.len() + 1);
    merged.push(entry);
    merged.extend_from_slice(existing);
    merged
}

/// What happened to an event handed to the projector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Sender is the focused conversation
    Suppressed,
    /// New entry at the head of the list
    Inserted(Notification),
    /// Entry with this id was already cached
    Duplicate(String),
}

#[derive(Debug, Clone)]
pub struct NotificationProjector {
    recipient_id: String,
    cache: QueryCache,
    toasts: ToastQueue,
}

impl NotificationProjector {
    pub fn new(recipient_id: impl Into<String>, cache: QueryCache, toasts: ToastQueue) -> Self {
        Self {
            recipient_id: recipient_id.into(),
            cache,
            toasts,
        }
    }

    /// Project an inbound message.
    ///
    /// `active_conversation` is the counterpart id currently on screen, if any.
    pub fn on_message(
        &self,
        message: &Message,
        active_conversation: Option<&str>,
        now: Instant,
    ) -> Projection {
        if active_conversation == Some(message.sender_id.as_str()) {
            tracing::debug!(
                "[Notify] Suppressed message from {} (conversation open)",
                message.sender_id
            );
            return Projection::Suppressed;
        }

        let body = truncate_body(&message.content);
        let notification = Notification {
            id: notification_id(message),
            recipient_id: self.recipient_id.clone(),
            kind: NotificationType::Message,
            title: MESSAGE_TITLE.to_string(),
            message: body,
            link: Some(format!("/messages/{}", message.sender_id)),
            read: false,
            created_at: message.created_at,
        };
        self.insert(notification, now)
    }

    /// Project a server-pushed notification
    pub fn on_notification(&self, mut notification: Notification, now: Instant) -> Projection {
        notification.message = truncate_body(&notification.message);
        self.insert(notification, now)
    }

    /// Cached notifications, newest first
    pub fn notifications(&self) -> Vec<Notification> {
        self.cache.get_or_default(NOTIFICATIONS_KEY)
    }

    pub fn unread_count(&self) -> usize {
        self.notifications().iter().filter(|n| !n.read).count()
    }

    /// Flag one entry read; returns false if the id is unknown
    pub fn mark_read(&self, id: &str) -> bool {
        let mut found = false;
        self.cache
            .update(NOTIFICATIONS_KEY, |mut list: Vec<Notification>| {
                if let Some(entry) = list.iter_mut().find(|n| n.id == id) {
                    entry.read = true;
                    found = true;
                }
                list
            });
        found
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    fn insert(&self, notification: Notification, now: Instant) -> Projection {
        let id = notification.id.clone();
        let mut inserted = false;
        self.cache
            .update(NOTIFICATIONS_KEY, |list: Vec<Notification>| {
                let merged = merge_notification(&list, notification.clone());
                inserted = merged.len() > list.len();
                merged
            });

        if !inserted {
            tracing::debug!("[Notify] Notification {} already cached", id);
            return Projection::Duplicate(id);
        }

        self.toasts.raise(
            id.clone(),
            notification.title.clone(),
            notification.message.clone(),
            now,
        );
        tracing::info!("[Notify] Cached notification {}", id);
        Projection::Inserted(notification)
    }
}
