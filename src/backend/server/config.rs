/**
 * Server Configuration
 *
 * Loaded from environment variables (after `dotenv`), with defaults suited
 * to local development:
 *
 * | Variable                 | Default |
 * |--------------------------|---------|
 * | `SERVER_PORT`            | 3000    |
 * | `JWT_SECRET`             | dev key |
 * | `RELAY_POLL_TIMEOUT_MS`  | 25000   |
 * | `RELAY_PING_INTERVAL_MS` | 25000   |
 * | `RELAY_PING_TIMEOUT_MS`  | 20000   |
 *
 * Unparsable values are logged and replaced by the default.
 */

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_POLL_TIMEOUT_MS: u64 = 25_000;
pub const DEFAULT_PING_INTERVAL_MS: u64 = 25_000;
pub const DEFAULT_PING_TIMEOUT_MS: u64 = 20_000;
const DEV_JWT_SECRET: &str = "draftio-dev-secret-change-in-production";

/// Relay server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub jwt_secret: String,
    /// How long a long-poll waits for frames before returning `[]`
    pub poll_timeout: Duration,
    pub ping_interval: Duration,
    pub ping_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            poll_timeout: Duration::from_millis(DEFAULT_POLL_TIMEOUT_MS),
            ping_interval: Duration::from_millis(DEFAULT_PING_INTERVAL_MS),
            ping_timeout: Duration::from_millis(DEFAULT_PING_TIMEOUT_MS),
        }
    }
}

impl ServerConfig {
    /// Read the configuration from the environment
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("[Server] JWT_SECRET not set, using the development secret");
            defaults.jwt_secret.clone()
        });

        Self {
            port: env_or("SERVER_PORT", defaults.port),
            jwt_secret,
            poll_timeout: Duration::from_millis(env_or(
                "RELAY_POLL_TIMEOUT_MS",
                DEFAULT_POLL_TIMEOUT_MS,
            )),
            ping_interval: Duration::from_millis(env_or(
                "RELAY_PING_INTERVAL_MS",
                DEFAULT_PING_INTERVAL_MS,
            )),
            ping_timeout: Duration::from_millis(env_or(
                "RELAY_PING_TIMEOUT_MS",
                DEFAULT_PING_TIMEOUT_MS,
            )),
        }
    }

    /// Idle time after which a polling session is reaped
    pub fn session_idle_limit(&self) -> Duration {
        self.ping_interval + self.ping_timeout
    }
}

fn env_or<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            tracing::warn!("[Server] Ignoring invalid {}={}: {}", name, raw, e);
            default
        }),
        Err(_) => default,
    }
}
