//! Query Cache
//!
//! A keyed, type-erased read cache shared by handle clones. Values are read
//! with a default and changed through functional updates (old value → new
//! value) performed under the write lock, so concurrent updates to the same
//! key never interleave.
//!
//! Eviction and TTL are not handled here.

use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Cache key holding the newest-first notification list
pub const NOTIFICATIONS_KEY: &str = "notifications";

type Entry = Box<dyn Any + Send + Sync>;

/// Shared keyed cache
#[derive(Clone, Default)]
pub struct QueryCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.read();
        f.debug_struct("QueryCache")
            .field("keys", &entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value under `key`, or `T::default()` when absent or of another type
    pub fn get_or_default<T>(&self, key: &str) -> T
    where
        T: Clone + Default + Send + Sync + 'static,
    {
        self.entries
            .read()
            .get(key)
            .and_then(|entry| entry.downcast_ref::<T>())
            .cloned()
            .unwrap_or_default()
    }

    /// Replace the value under `key`
    pub fn set<T>(&self, key: &str, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.entries.write().insert(key.to_string(), Box::new(value));
    }

    /// Functional update: `f` receives the current value (or the default)
    /// and returns the new one. Returns a clone of the stored result.
    pub fn update<T, F>(&self, key: &str, f: F) -> T
    where
        T: Clone + Default + Send + Sync + 'static,
        F: FnOnce(T) -> T,
    {
        let mut entries = self.entries.write();
        let current = match entries.remove(key) {
            Some(entry) => match entry.downcast::<T>() {
                Ok(value) => *value,
                Err(_) => {
                    tracing::warn!("[Cache] Entry '{}' had an unexpected type, resetting", key);
                    T::default()
                }
            },
            None => T::default(),
        };
        let next = f(current);
        entries.insert(key.to_string(), Box::new(next.clone()));
        next
    }

    /// Drop the value under `key`
    pub fn invalidate(&self, key: &str) {
        self.entries.write().remove(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }
}
