//! Presence & Typing State
//!
//! Client-local sets driven strictly by relay events; reads never touch the
//! network.
//!
//! Typing entries carry a deadline. Every typing-start event for a user
//! pushes that user's deadline out again (debounce), so an indicator does not
//! vanish while the counterpart keeps typing. Expired entries are pruned
//! lazily on read.

use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::time::Instant;

/// Users currently online
#[derive(Debug, Default, Clone)]
pub struct PresenceSet {
    online: HashSet<String>,
}

impl PresenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a user online; returns false if already present
    pub fn add(&mut self, user_id: impl Into<String>) -> bool {
        self.online.insert(user_id.into())
    }

    /// Mark a user offline; returns false if not present
    pub fn remove(&mut self, user_id: &str) -> bool {
        self.online.remove(user_id)
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.online.contains(user_id)
    }

    /// Forget everyone (on reconnect the server re-announces presence)
    pub fn reset(&mut self) {
        self.online.clear();
    }

    pub fn len(&self) -> usize {
        self.online.len()
    }

    pub fn is_empty(&self) -> bool {
        self.online.is_empty()
    }

    pub fn users(&self) -> impl Iterator<Item = &str> {
        self.online.iter().map(String::as_str)
    }
}

/// Users currently typing, with expiry
#[derive(Debug, Clone)]
pub struct TypingTracker {
    expiry: Duration,
    deadlines: HashMap<String, Instant>,
}

impl TypingTracker {
    pub fn new(expiry: Duration) -> Self {
        Self {
            expiry,
            deadlines: HashMap::new(),
        }
    }

    /// Typing-start: (re)arm the user's expiry window
    pub fn start(&mut self, user_id: impl Into<String>, now: Instant) {
        self.deadlines.insert(user_id.into(), now + self.expiry);
    }

    /// Typing-stop
    pub fn stop(&mut self, user_id: &str) {
        self.deadlines.remove(user_id);
    }

    pub fn is_typing(&self, user_id: &str, now: Instant) -> bool {
        self.deadlines
            .get(user_id)
            .is_some_and(|deadline| *deadline > now)
    }

    /// Drop expired entries
    pub fn prune(&mut self, now: Instant) {
        self.deadlines.retain(|_, deadline| *deadline > now);
    }

    /// Users typing at `now`, sorted
    pub fn typing_users(&self, now: Instant) -> Vec<String> {
        let mut users: Vec<String> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline > now)
            .map(|(user, _)| user.clone())
            .collect();
        users.sort();
        users
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }
}
