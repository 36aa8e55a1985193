//! # Reconnect Policy
//!
//! Fixed-delay, bounded retry. The delay never grows between attempts; once
//! the attempt cap is exhausted the connection is considered failed and only
//! an explicit `connect` brings it back.

use std::time::Duration;

use crate::shared::RelayConfig;

/// Bounded fixed-delay reconnect policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before every reconnect attempt
    pub delay: Duration,
    /// Reconnect attempts allowed after a failure
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from_config(&RelayConfig::default())
    }
}

impl ReconnectPolicy {
    pub fn new(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts,
        }
    }

    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(config.reconnect_delay(), config.max_reconnect_attempts)
    }

    /// Delay to wait before reconnect attempt number `attempt` (1-based)
    ///
    /// `None` once the cap is exhausted.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        (attempt >= 1 && attempt <= self.max_attempts).then_some(self.delay)
    }
}
