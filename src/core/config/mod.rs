//! Relay configuration
//!
//! Non-secret settings come from a TOML file with `BOARDRELAY_` environment
//! overrides. Secrets (board token, board id, bot token) are only ever read
//! from the environment, at the moment a command needs them.

pub mod loader;
pub mod secrets;

pub use loader::{EnvLoader, FileLoader};
pub use secrets::{AccessToken, BoardTarget, EnvSecrets, SecretSource};

use crate::core::constants::defaults;
use crate::core::error_recovery::RetryPolicy;
use crate::core::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Main relay configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Control surface listener
    pub server: ServerConfig,

    /// Poll loop and capacity
    pub monitor: MonitorConfig,

    /// Notification delivery retries
    pub delivery: DeliveryConfig,

    /// Upstream API endpoints
    pub api: ApiConfig,

    /// Chat command behaviour
    pub commands: CommandConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: defaults::BIND_ADDR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub poll_interval_secs: u64,
    /// Upper bound of the random delay added to each poll interval
    pub poll_jitter_secs: u64,
    pub max_monitors: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: defaults::POLL_INTERVAL_SECS,
            poll_jitter_secs: 0,
            max_monitors: defaults::MAX_MONITORS,
        }
    }
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn poll_jitter(&self) -> Duration {
        Duration::from_secs(self.poll_jitter_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub max_retries: usize,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_retries: policy.max_retries,
            initial_delay_ms: policy.initial_delay.as_millis() as u64,
            max_delay_ms: policy.max_delay.as_millis() as u64,
            backoff_multiplier: policy.backoff_multiplier,
        }
    }
}

impl DeliveryConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            backoff_multiplier: self.backoff_multiplier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub board_api_base: String,
    pub messaging_api_base: String,
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            board_api_base: defaults::BOARD_API_BASE.to_string(),
            messaging_api_base: defaults::MESSAGING_API_BASE.to_string(),
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Reply in the chat when /start or /stop succeeds or fails
    pub acknowledge: bool,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self { acknowledge: true }
    }
}

impl RelayConfig {
    /// Load configuration: defaults, then the TOML file, then environment overrides.
    ///
    /// An explicit `path` must exist. Without one, `boardrelay.toml` in the
    /// working directory is used when present.
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => FileLoader::new(path.to_path_buf()).load().await?,
            None => {
                let loader = FileLoader::new(defaults::CONFIG_FILE.into());
                if loader.exists() {
                    loader.load().await?
                } else {
                    debug!("No {} found, using defaults", defaults::CONFIG_FILE);
                    Self::default()
                }
            }
        };

        let config = EnvLoader::default().apply_env_overrides(config)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the relay cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(invalid(
                "server.bind",
                &self.server.bind,
                "expected an address such as 0.0.0.0:7000",
            ));
        }

        if self.monitor.poll_interval_secs == 0 {
            return Err(invalid("monitor.poll_interval_secs", "0", "must be positive"));
        }

        if self.monitor.poll_jitter_secs > self.monitor.poll_interval_secs {
            return Err(invalid(
                "monitor.poll_jitter_secs",
                &self.monitor.poll_jitter_secs.to_string(),
                "must not exceed the poll interval",
            ));
        }

        if self.monitor.max_monitors == 0 {
            return Err(invalid("monitor.max_monitors", "0", "must be positive"));
        }

        if self.delivery.backoff_multiplier < 1.0 {
            return Err(invalid(
                "delivery.backoff_multiplier",
                &self.delivery.backoff_multiplier.to_string(),
                "must be at least 1.0",
            ));
        }

        if self.delivery.initial_delay_ms > self.delivery.max_delay_ms {
            return Err(invalid(
                "delivery.initial_delay_ms",
                &self.delivery.initial_delay_ms.to_string(),
                "must not exceed delivery.max_delay_ms",
            ));
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind
            .parse()
            .map_err(|_| invalid("server.bind", &self.server.bind, "not a socket address"))
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
