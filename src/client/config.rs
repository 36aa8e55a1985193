use crate::shared::config::{ConfigError, RelayConfig, RelayConfigBuilder, DEFAULT_SERVER_URL};

/// Client configuration wrapper.
///
/// Wraps the shared [`RelayConfig`] and derives the concrete relay endpoint
/// URLs from the server base URL.
#[derive(Debug, Clone)]
pub struct Config {
    relay: RelayConfig,
}

impl Default for Config {
    fn default() -> Self {
        let relay = RelayConfig::default()
            .with_env_overrides()
            .unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid relay environment overrides: {}", e);
                RelayConfig::default()
            });
        Self { relay }
    }
}

impl Config {
    /// Create a new configuration from defaults and the environment
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builder(builder: RelayConfigBuilder) -> Result<Self, ConfigError> {
        Ok(Self {
            relay: builder.build()?,
        })
    }

    pub fn from_relay(relay: RelayConfig) -> Result<Self, ConfigError> {
        relay.validate()?;
        Ok(Self { relay })
    }

    pub fn relay(&self) -> &RelayConfig {
        &self.relay
    }

    pub fn server_url(&self) -> &str {
        let url = self.relay.server_url.trim_end_matches('/');
        if url.is_empty() {
            DEFAULT_SERVER_URL
        } else {
            url
        }
    }

    /// Get the full URL for an HTTP endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url(), path)
    }

    /// Get the full URL for a WebSocket endpoint (`http` → `ws`, `https` → `wss`)
    pub fn ws_url(&self, path: &str) -> String {
        let base = self.server_url();
        let base = match base.strip_prefix("https://") {
            Some(rest) => format!("wss://{}", rest),
            None => match base.strip_prefix("http://") {
                Some(rest) => format!("ws://{}", rest),
                None => base.to_string(),
            },
        };
        format!("{}{}", base, path)
    }
}
