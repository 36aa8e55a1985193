//! Relay Session Registry
//!
//! Every handshake creates a [`RelaySession`] with its own unbounded frame
//! queue. The queue is drained either by long-poll requests or, once the
//! session upgrades, by its WebSocket pump. Sessions are indexed by id and by
//! user so frames can be fanned out to every session of a user.

use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use uuid::Uuid;

use crate::shared::Frame;

/// One client's relay session
#[derive(Debug)]
pub struct RelaySession {
    pub sid: String,
    pub user_id: String,
    tx: mpsc::UnboundedSender<Frame>,
    rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Frame>>,
    upgraded: AtomicBool,
    last_seen: Mutex<Instant>,
}

impl RelaySession {
    fn new(user_id: &str) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            sid: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            tx,
            rx: tokio::sync::Mutex::new(rx),
            upgraded: AtomicBool::new(false),
            last_seen: Mutex::new(Instant::now()),
        }
    }

    /// Queue a frame for delivery
    pub fn push(&self, frame: Frame) -> bool {
        self.tx.send(frame).is_ok()
    }

    /// Exclusive access to the outbound queue
    pub async fn queue(&self) -> tokio::sync::MutexGuard<'_, mpsc::UnboundedReceiver<Frame>> {
        self.rx.lock().await
    }

    #[cfg(test)]
    pub(crate) fn try_queue(
        &self,
    ) -> Option<tokio::sync::MutexGuard<'_, mpsc::UnboundedReceiver<Frame>>> {
        self.rx.try_lock().ok()
    }

    pub fn mark_upgraded(&self) {
        self.upgraded.store(true, Ordering::SeqCst);
    }

    pub fn is_upgraded(&self) -> bool {
        self.upgraded.load(Ordering::SeqCst)
    }

    /// Record client activity
    pub fn touch(&self) {
        *self.last_seen.lock() = Instant::now();
    }

    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(*self.last_seen.lock())
    }
}

#[derive(Debug, Default)]
struct Inner {
    sessions: HashMap<String, Arc<RelaySession>>,
    by_user: HashMap<String, HashSet<String>>,
}

/// All live relay sessions
#[derive(Debug, Default)]
pub struct SessionRegistry {
    inner: RwLock<Inner>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session for `user_id`.
    ///
    /// The flag is true when this is the user's only session.
    pub fn create(&self, user_id: &str) -> (Arc<RelaySession>, bool) {
        let session = Arc::new(RelaySession::new(user_id));
        let mut inner = self.inner.write();
        inner
            .sessions
            .insert(session.sid.clone(), Arc::clone(&session));
        let sids = inner.by_user.entry(user_id.to_string()).or_default();
        sids.insert(session.sid.clone());
        let first = sids.len() == 1;
        (session, first)
    }

    pub fn get(&self, sid: &str) -> Option<Arc<RelaySession>> {
        self.inner.read().sessions.get(sid).cloned()
    }

    /// Remove a session.
    ///
    /// The flag is true when the user has no sessions left.
    pub fn remove(&self, sid: &str) -> Option<(Arc<RelaySession>, bool)> {
        let mut inner = self.inner.write();
        let session = inner.sessions.remove(sid)?;
        let last = match inner.by_user.get_mut(&session.user_id) {
            Some(sids) => {
                sids.remove(sid);
                sids.is_empty()
            }
            None => true,
        };
        if last {
            inner.by_user.remove(&session.user_id);
        }
        Some((session, last))
    }

    /// Queue `frame` on every session of `user_id`; returns how many
    pub fn send_to_user(&self, user_id: &str, frame: &Frame) -> usize {
        let inner = self.inner.read();
        let Some(sids) = inner.by_user.get(user_id) else {
            return 0;
        };
        sids.iter()
            .filter_map(|sid| inner.sessions.get(sid))
            .filter(|session| session.push(frame.clone()))
            .count()
    }

    /// Queue `frame` on every session not belonging to `user_id`
    pub fn broadcast_except(&self, user_id: &str, frame: &Frame) -> usize {
        self.inner
            .read()
            .sessions
            .values()
            .filter(|session| session.user_id != user_id)
            .filter(|session| session.push(frame.clone()))
            .count()
    }

    /// Users with at least one session
    pub fn online_users(&self) -> Vec<String> {
        let mut users: Vec<String> = self.inner.read().by_user.keys().cloned().collect();
        users.sort();
        users
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.inner.read().by_user.contains_key(user_id)
    }

    /// Polling sessions idle for at least `limit`
    pub fn idle_polling_sessions(&self, limit: Duration, now: Instant) -> Vec<String> {
        self.inner
            .read()
            .sessions
            .values()
            .filter(|session| !session.is_upgraded() && session.idle_for(now) >= limit)
            .map(|session| session.sid.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
