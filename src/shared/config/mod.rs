//! Relay configuration module
//!
//! Tunables for the relay client: where the server lives, how reconnection
//! behaves, and how long transient UI state (typing flags, toasts) lives.
//! Values come from defaults, an optional TOML file and environment
//! overrides, in that order.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default relay server URL
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";
/// Default fixed delay between reconnect attempts
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 1_000;
/// Default reconnect attempt cap
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;
/// Accepted range for the reconnect attempt cap
pub const RECONNECT_ATTEMPTS_RANGE: std::ops::RangeInclusive<u32> = 5..=10;
/// Typing indicators expire this long after the last typing-start event
pub const DEFAULT_TYPING_EXPIRY_MS: u64 = 3_000;
/// How long a toast stays visible
pub const DEFAULT_TOAST_DURATION_MS: u64 = 4_000;

/// Relay client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Relay server base URL (http or https)
    pub server_url: String,
    /// Fixed delay between reconnect attempts
    pub reconnect_delay_ms: u64,
    /// Reconnect attempts before the connection is considered failed
    pub max_reconnect_attempts: u32,
    /// Whether to upgrade from long-polling to WebSocket after the handshake
    pub allow_upgrade: bool,
    pub typing_expiry_ms: u64,
    pub toast_duration_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            allow_upgrade: true,
            typing_expiry_ms: DEFAULT_TYPING_EXPIRY_MS,
            toast_duration_ms: DEFAULT_TOAST_DURATION_MS,
        }
    }
}

impl RelayConfig {
    /// Create a new RelayConfigBuilder
    pub fn builder() -> RelayConfigBuilder {
        RelayConfigBuilder::default()
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Apply `CLIENT_API_URL`, `RELAY_RECONNECT_DELAY_MS` and
    /// `RELAY_MAX_RECONNECT_ATTEMPTS` from the environment
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(url) = std::env::var("CLIENT_API_URL") {
            self.server_url = url;
        }
        if let Ok(raw) = std::env::var("RELAY_RECONNECT_DELAY_MS") {
            self.reconnect_delay_ms = raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("RELAY_RECONNECT_DELAY_MS", raw))?;
        }
        if let Ok(raw) = std::env::var("RELAY_MAX_RECONNECT_ATTEMPTS") {
            self.max_reconnect_attempts = raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("RELAY_MAX_RECONNECT_ATTEMPTS", raw))?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.server_url)
            .map_err(|_| ConfigError::InvalidUrl(self.server_url.clone()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(self.server_url.clone()));
        }
        if !RECONNECT_ATTEMPTS_RANGE.contains(&self.max_reconnect_attempts) {
            return Err(ConfigError::InvalidValue(
                "max_reconnect_attempts",
                self.max_reconnect_attempts.to_string(),
            ));
        }
        if self.typing_expiry_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "typing_expiry_ms",
                self.typing_expiry_ms.to_string(),
            ));
        }
        Ok(())
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn typing_expiry(&self) -> Duration {
        Duration::from_millis(self.typing_expiry_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}

/// Builder for RelayConfig
#[derive(Debug, Default)]
pub struct RelayConfigBuilder {
    config: RelayConfig,
}

impl RelayConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.config.server_url = url.into();
        self
    }

    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.config.reconnect_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.config.max_reconnect_attempts = attempts;
        self
    }

    pub fn allow_upgrade(mut self, allow: bool) -> Self {
        self.config.allow_upgrade = allow;
        self
    }

    pub fn typing_expiry(mut self, expiry: Duration) -> Self {
        self.config.typing_expiry_ms = expiry.as_millis() as u64;
        self
    }

    pub fn toast_duration(mut self, duration: Duration) -> Self {
        self.config.toast_duration_ms = duration.as_millis() as u64;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<RelayConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
}
