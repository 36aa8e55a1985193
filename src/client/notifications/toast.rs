//! Transient toasts.
//!
//! A toast is visible for a fixed duration. Raising a toast whose id is still
//! visible does nothing, so a replayed event never stacks identical toasts.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// A visible toast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: String,
    pub title: String,
    pub body: String,
    pub raised_at: Instant,
}

/// Shared queue of visible toasts
#[derive(Debug, Clone)]
pub struct ToastQueue {
    duration: Duration,
    visible: Arc<Mutex<Vec<Toast>>>,
}

impl ToastQueue {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            visible: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Show a toast; returns false if one with the same id is still visible
    pub fn raise(
        &self,
        id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        now: Instant,
    ) -> bool {
        let id = id.into();
        let mut visible = self.visible.lock();
        visible.retain(|toast| toast.raised_at + self.duration > now);
        if visible.iter().any(|toast| toast.id == id) {
            tracing::debug!("[Notify] Toast {} already visible", id);
            return false;
        }
        let toast = Toast {
            id,
            title: title.into(),
            body: body.into(),
            raised_at: now,
        };
        tracing::info!("[Notify] Toast '{}': {}", toast.title, toast.body);
        visible.push(toast);
        true
    }

    /// Toasts visible at `now`, oldest first
    pub fn active(&self, now: Instant) -> Vec<Toast> {
        self.visible
            .lock()
            .iter()
            .filter(|toast| toast.raised_at + self.duration > now)
            .cloned()
            .collect()
    }

    pub fn dismiss(&self, id: &str) {
        self.visible.lock().retain(|toast| toast.id != id);
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}
