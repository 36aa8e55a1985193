//! Relay Hub
//!
//! Routing rules applied to client frames, plus presence bookkeeping when
//! sessions open and close.
//!
//! - `send_message` → a stored-shape message with a server id and timestamp,
//!   delivered as `receive_message` to the receiver and `message_sent` to the
//!   sender's own sessions
//! - `typing` → `typing_indicator` to the receiver
//! - first session of a user → `user_online` to everyone else; last session
//!   closed → `user_offline`

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::backend::error::BackendError;
use crate::backend::relay::registry::{RelaySession, SessionRegistry};
use crate::shared::message::{lookup_bool, lookup_string};
use crate::shared::{EventType, Frame, Message, Notification, SharedError};

/// Stable conversation id for a pair of users
pub fn conversation_id(a: &str, b: &str) -> String {
    if a <= b {
        format!("{}:{}", a, b)
    } else {
        format!("{}:{}", b, a)
    }
}

#[derive(Debug, Clone)]
pub struct RelayHub {
    registry: Arc<SessionRegistry>,
}

impl RelayHub {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Open a session for an authenticated user.
    ///
    /// The new session is primed with `user_online` for everyone already
    /// online.
    pub fn open_session(&self, user_id: &str) -> Arc<RelaySession> {
        let (session, first) = self.registry.create(user_id);
        for online in self.registry.online_users() {
            if online != user_id {
                session.push(Frame::presence(&online, true));
            }
        }
        if first {
            let notified = self
                .registry
                .broadcast_except(user_id, &Frame::presence(user_id, true));
            tracing::info!("[Relay] {} online ({} sessions notified)", user_id, notified);
        }
        tracing::debug!("[Relay] Session {} opened for {}", session.sid, user_id);
        session
    }

    /// Close a session; idempotent
    pub fn close_session(&self, sid: &str) {
        let Some((session, last)) = self.registry.remove(sid) else {
            return;
        };
        tracing::debug!("[Relay] Session {} closed for {}", sid, session.user_id);
        if last {
            let notified = self
                .registry
                .broadcast_except(&session.user_id, &Frame::presence(&session.user_id, false));
            tracing::info!("[Relay] {} offline ({} sessions notified)", session.user_id, notified);
        }
    }

    /// Close polling sessions nobody polled for `limit`; returns their ids
    pub fn reap_idle(&self, limit: Duration, now: Instant) -> Vec<String> {
        let idle = self.registry.idle_polling_sessions(limit, now);
        for sid in &idle {
            self.close_session(sid);
        }
        idle
    }

    /// Apply one frame sent by `session`
    pub fn handle_frame(&self, session: &RelaySession, frame: Frame) -> Result<(), BackendError> {
        session.touch();
        match frame.event_type() {
            Some(EventType::SendMessage) => {
                self.route_message(&session.user_id, &frame.data)?;
            }
            Some(EventType::Typing) => {
                let receiver_id = required(&frame.data, &["receiverId", "receiver_id"], "receiverId")?;
                let is_typing = lookup_bool(&frame.data, &["isTyping", "is_typing"]).unwrap_or(false);
                self.registry.send_to_user(
                    &receiver_id,
                    &Frame::typing_indicator(&session.user_id, is_typing),
                );
            }
            _ => {
                tracing::debug!("[Relay] Ignoring '{}' from {}", frame.event, session.user_id);
            }
        }
        Ok(())
    }

    /// Deliver a direct message and echo it to the sender
    pub fn route_message(&self, sender_id: &str, data: &Value) -> Result<Message, BackendError> {
        let receiver_id = required(data, &["receiverId", "receiver_id"], "receiverId")?;
        let content = lookup_string(data, &["content"]);
        if content.trim().is_empty() {
            return Err(SharedError::validation("content", "message content is empty").into());
        }

        let message = Message::new(
            uuid::Uuid::new_v4().to_string(),
            sender_id,
            receiver_id.as_str(),
            content,
        )
        .with_conversation(conversation_id(sender_id, &receiver_id));

        let delivered = self
            .registry
            .send_to_user(&receiver_id, &Frame::message(EventType::ReceiveMessage, &message)?);
        self.registry
            .send_to_user(sender_id, &Frame::message(EventType::MessageSent, &message)?);
        tracing::debug!(
            "[Relay] Message {} from {} to {} ({} sessions)",
            message.id,
            sender_id,
            receiver_id,
            delivered
        );
        Ok(message)
    }

    /// Push a notification to every session of its recipient
    pub fn push_notification(&self, notification: &Notification) -> Result<usize, BackendError> {
        let frame = Frame::new(
            EventType::NewNotification,
            serde_json::to_value(notification)?,
        );
        let delivered = self.registry.send_to_user(&notification.recipient_id, &frame);
        tracing::info!(
            "[Relay] Notification {} for {} ({} sessions)",
            notification.id,
            notification.recipient_id,
            delivered
        );
        Ok(delivered)
    }
}

fn required(data: &Value, keys: &[&str], field: &'static str) -> Result<String, BackendError> {
    let value = lookup_string(data, keys);
    if value.is_empty() {
        return Err(SharedError::validation(field, "missing").into());
    }
    Ok(value)
}
