//! Message Store
//!
//! In-memory, per-conversation message sequences. A conversation is keyed by
//! the counterpart's user id; messages are appended in arrival order and
//! never deduplicated.

use std::collections::HashMap;

use crate::shared::Message;

/// Ordered messages grouped by counterpart
#[derive(Debug, Default)]
pub struct MessageStore {
    current_user_id: String,
    conversations: HashMap<String, Vec<Message>>,
}

impl MessageStore {
    pub fn new(current_user_id: impl Into<String>) -> Self {
        Self {
            current_user_id: current_user_id.into(),
            conversations: HashMap::new(),
        }
    }

    /// Conversation key for `message` from the current user's point of view
    pub fn conversation_key<'a>(&self, message: &'a Message) -> &'a str {
        if message.sender_id == self.current_user_id {
            &message.receiver_id
        } else {
            &message.sender_id
        }
    }

    /// Append `message` and return its conversation key
    pub fn append(&mut self, message: Message) -> String {
        let key = self.conversation_key(&message).to_string();
        self.conversations
            .entry(key.clone())
            .or_default()
            .push(message);
        key
    }

    /// Messages exchanged with `counterpart_id`, oldest first
    pub fn conversation(&self, counterpart_id: &str) -> &[Message] {
        self.conversations
            .get(counterpart_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Counterparts with at least one message
    pub fn counterparts(&self) -> impl Iterator<Item = &str> {
        self.conversations.keys().map(String::as_str)
    }

    /// Most recent message of a conversation
    pub fn last_message(&self, counterpart_id: &str) -> Option<&Message> {
        self.conversation(counterpart_id).last()
    }

    pub fn len(&self) -> usize {
        self.conversations.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}
