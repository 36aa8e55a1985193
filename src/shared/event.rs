/**
 * Relay Event System
 *
 * This module defines the wire envelope exchanged over the relay and the
 * typed events the client hands to its subscribers.
 *
 * # Wire Format
 *
 * Every frame is a JSON object `{"event": <name>, "data": <payload>}`. The
 * same envelope is used on both transports (long-polling bodies and
 * WebSocket text messages).
 *
 * # Event Names
 *
 * Server → client: `receive_message`, `message_sent`, `user_online`,
 * `user_offline`, `typing_indicator`, `new_notification`.
 *
 * Client → server: `send_message`, `typing`.
 */
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::shared::error::SharedError;
use crate::shared::message::{lookup_bool, lookup_string, normalize_message, Message};
use crate::shared::notification::Notification;

/// Known relay event names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Message addressed to this user
    ReceiveMessage,
    /// Echo of a message this user sent
    MessageSent,
    /// A user came online
    UserOnline,
    /// A user went offline
    UserOffline,
    /// Typing started/stopped
    TypingIndicator,
    /// Server-pushed notification
    NewNotification,
    /// Client request to deliver a message
    SendMessage,
    /// Client typing report
    Typing,
}

impl EventType {
    /// Wire name of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReceiveMessage => "receive_message",
            Self::MessageSent => "message_sent",
            Self::UserOnline => "user_online",
            Self::UserOffline => "user_offline",
            Self::TypingIndicator => "typing_indicator",
            Self::NewNotification => "new_notification",
            Self::SendMessage => "send_message",
            Self::Typing => "typing",
        }
    }

    /// Parse a wire name
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "receive_message" => Some(Self::ReceiveMessage),
            "message_sent" => Some(Self::MessageSent),
            "user_online" => Some(Self::UserOnline),
            "user_offline" => Some(Self::UserOffline),
            "typing_indicator" => Some(Self::TypingIndicator),
            "new_notification" => Some(Self::NewNotification),
            "send_message" => Some(Self::SendMessage),
            "typing" => Some(Self::Typing),
            _ => None,
        }
    }
}

/// Transport currently carrying a relay session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    /// HTTP long-polling (the negotiation starting point)
    Polling,
    /// Upgraded persistent WebSocket
    WebSocket,
}

/// Wire envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Frame {
    /// Event name
    pub event: String,
    /// Event payload
    #[serde(default)]
    pub data: Value,
}

impl Frame {
    /// Create a frame for a known event
    pub fn new(event: EventType, data: Value) -> Self {
        Self {
            event: event.as_str().to_string(),
            data,
        }
    }

    /// Parse a frame from JSON text
    pub fn from_json(text: &str) -> Result<Self, SharedError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize the frame to JSON text
    pub fn to_json(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Typed event name, if known
    pub fn event_type(&self) -> Option<EventType> {
        EventType::parse(&self.event)
    }

    /// Client request to deliver `content` to `receiver_id`
    pub fn send_message(receiver_id: &str, content: &str) -> Self {
        Self::new(
            EventType::SendMessage,
            json!({ "receiverId": receiver_id, "content": content }),
        )
    }

    /// Client typing report for the conversation with `receiver_id`
    pub fn typing(receiver_id: &str, is_typing: bool) -> Self {
        Self::new(
            EventType::Typing,
            json!({ "receiverId": receiver_id, "isTyping": is_typing }),
        )
    }

    /// Presence frame (`user_online` / `user_offline`)
    pub fn presence(user_id: &str, online: bool) -> Self {
        let event = if online {
            EventType::UserOnline
        } else {
            EventType::UserOffline
        };
        Self::new(event, json!({ "userId": user_id }))
    }

    /// Typing indicator relayed to the counterpart
    pub fn typing_indicator(sender_id: &str, is_typing: bool) -> Self {
        Self::new(
            EventType::TypingIndicator,
            json!({ "senderId": sender_id, "isTyping": is_typing }),
        )
    }

    /// Message frame (`receive_message` or `message_sent`)
    pub fn message(event: EventType, message: &Message) -> Result<Self, SharedError> {
        Ok(Self::new(event, serde_json::to_value(message)?))
    }
}

/// Typed event delivered to relay subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    /// Transport established (also after every reconnect)
    Connected { mode: TransportMode },
    /// Inbound message for this user
    ReceiveMessage(Message),
    /// Echo of this user's own message
    MessageSent(Message),
    UserOnline { user_id: String },
    UserOffline { user_id: String },
    TypingIndicator { sender_id: String, is_typing: bool },
    /// Server-pushed notification
    NewNotification(Notification),
    /// Handshake or transport failure; reconnection may follow
    ConnectionError { message: String },
    /// Established transport went away
    Disconnected { reason: String },
    /// Reconnect attempts exhausted
    Failed { attempts: u32 },
}

impl RelayEvent {
    /// Decode an inbound frame.
    ///
    /// Unknown events, client-only events and presence frames without a user
    /// id yield `None`; message payloads never fail thanks to the normalizer.
    pub fn from_frame(frame: &Frame) -> Option<Self> {
        let data = &frame.data;
        match frame.event_type()? {
            EventType::ReceiveMessage => Some(Self::ReceiveMessage(normalize_message(data))),
            EventType::MessageSent => Some(Self::MessageSent(normalize_message(data))),
            EventType::UserOnline => {
                non_empty(lookup_string(data, &["userId", "user_id"]))
                    .map(|user_id| Self::UserOnline { user_id })
            }
            EventType::UserOffline => {
                non_empty(lookup_string(data, &["userId", "user_id"]))
                    .map(|user_id| Self::UserOffline { user_id })
            }
            EventType::TypingIndicator => {
                non_empty(lookup_string(data, &["senderId", "sender_id"])).map(|sender_id| {
                    Self::TypingIndicator {
                        sender_id,
                        is_typing: lookup_bool(data, &["isTyping", "is_typing"]).unwrap_or(false),
                    }
                })
            }
            EventType::NewNotification => Notification::from_payload(data).map(Self::NewNotification),
            EventType::SendMessage | EventType::Typing => None,
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
