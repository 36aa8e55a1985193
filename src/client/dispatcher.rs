//! # Realtime Dispatcher
//!
//! Applies relay events to client-local state, one at a time and in the order
//! the connection published them.
//!
//! ## State touched per event
//!
//! - **Connected**: presence and typing sets are reset; the server re-announces
//!   who is online after every (re)connect
//! - **ReceiveMessage**: appended to the store, sender's typing flag cleared,
//!   handed to the notification projector
//! - **MessageSent**: appended to the store
//! - **UserOnline / UserOffline**: presence set
//! - **TypingIndicator**: typing tracker
//! - **NewNotification**: handed to the notification projector
//!
//! Connection errors and disconnects are only logged; the connection task
//! owns recovery.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::Instant;

use crate::client::messaging::{MessageStore, PresenceSet, TypingTracker};
use crate::client::notifications::{NotificationProjector, Projection};
use crate::shared::RelayEvent;

/// Link status as seen through the event stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Reconnecting,
    Failed,
}

/// Everything the UI reads about the realtime session
#[derive(Debug)]
pub struct RealtimeState {
    current_user_id: String,
    messages: MessageStore,
    presence: PresenceSet,
    typing: TypingTracker,
    active_conversation: Option<String>,
    status: ConnectionStatus,
    projector: NotificationProjector,
}

impl RealtimeState {
    pub fn new(
        current_user_id: impl Into<String>,
        typing: TypingTracker,
        projector: NotificationProjector,
    ) -> Self {
        let current_user_id = current_user_id.into();
        Self {
            messages: MessageStore::new(current_user_id.clone()),
            current_user_id,
            presence: PresenceSet::new(),
            typing,
            active_conversation: None,
            status: ConnectionStatus::Connecting,
            projector,
        }
    }

    /// Apply one event
    pub fn handle(&mut self, event: RelayEvent, now: Instant) {
        match event {
            RelayEvent::Connected { mode } => {
                tracing::info!("[Dispatch] Connected via {:?}", mode);
                self.presence.reset();
                self.typing.clear();
                self.status = ConnectionStatus::Connected;
            }
            RelayEvent::ReceiveMessage(message) => {
                self.typing.stop(&message.sender_id);
                let projection =
                    self.projector
                        .on_message(&message, self.active_conversation.as_deref(), now);
                if let Projection::Inserted(ref notification) = projection {
                    tracing::debug!("[Dispatch] Notification {} raised", notification.id);
                }
                self.messages.append(message);
            }
            RelayEvent::MessageSent(message) => {
                self.messages.append(message);
            }
            RelayEvent::UserOnline { user_id } => {
                if user_id != self.current_user_id {
                    self.presence.add(user_id);
                }
            }
            RelayEvent::UserOffline { user_id } => {
                self.presence.remove(&user_id);
                self.typing.stop(&user_id);
            }
            RelayEvent::TypingIndicator {
                sender_id,
                is_typing,
            } => {
                if is_typing {
                    self.typing.start(sender_id, now);
                } else {
                    self.typing.stop(&sender_id);
                }
            }
            RelayEvent::NewNotification(notification) => {
                self.projector.on_notification(notification, now);
            }
            RelayEvent::ConnectionError { message } => {
                tracing::warn!("[Dispatch] Connection error: {}", message);
                self.status = ConnectionStatus::Reconnecting;
            }
            RelayEvent::Disconnected { reason } => {
                tracing::warn!("[Dispatch] Disconnected: {}", reason);
                self.status = ConnectionStatus::Reconnecting;
            }
            RelayEvent::Failed { attempts } => {
                tracing::error!("[Dispatch] Relay gave up after {} attempts", attempts);
                self.status = ConnectionStatus::Failed;
            }
        }
        self.typing.prune(now);
    }

    /// Set or clear the conversation currently on screen
    pub fn focus_conversation(&mut self, counterpart_id: Option<&str>) {
        self.active_conversation = counterpart_id.map(str::to_string);
    }

    pub fn active_conversation(&self) -> Option<&str> {
        self.active_conversation.as_deref()
    }

    pub fn current_user_id(&self) -> &str {
        &self.current_user_id
    }

    pub fn messages(&self) -> &MessageStore {
        &self.messages
    }

    pub fn presence(&self) -> &PresenceSet {
        &self.presence
    }

    pub fn typing(&self) -> &TypingTracker {
        &self.typing
    }

    pub fn is_typing(&self, user_id: &str, now: Instant) -> bool {
        self.typing.is_typing(user_id, now)
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn projector(&self) -> &NotificationProjector {
        &self.projector
    }
}

/// Drain `events` into `state` until the channel closes.
///
/// Handlers run to completion before the next event is read. A lagging
/// receiver skips the overwritten events and keeps going.
pub async fn run_dispatch(
    state: Arc<Mutex<RealtimeState>>,
    mut events: broadcast::Receiver<RelayEvent>,
) {
    loop {
        match events.recv().await {
            Ok(event) => state.lock().handle(event, Instant::now()),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("[Dispatch] Lagged behind, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => {
                tracing::debug!("[Dispatch] Event stream closed");
                break;
            }
        }
    }
}
