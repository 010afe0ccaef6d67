//! File and environment configuration loaders

use super::RelayConfig;
use crate::core::constants::env_vars;
use crate::core::errors::ConfigError;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;
use tracing::{debug, info};

/// TOML file configuration loader
pub struct FileLoader {
    file_path: PathBuf,
}

impl FileLoader {
    pub fn new(file_path: PathBuf) -> Self {
        Self { file_path }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn exists(&self) -> bool {
        self.file_path.exists()
    }

    pub async fn load(&self) -> Result<RelayConfig, ConfigError> {
        debug!("Loading config from file: {}", self.file_path.display());

        let content = fs::read_to_string(&self.file_path)
            .await
            .map_err(|source| ConfigError::Read {
                path: self.file_path.clone(),
                source,
            })?;

        let config: RelayConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: self.file_path.clone(),
            source,
        })?;

        info!("Loaded config from file: {}", self.file_path.display());
        Ok(config)
    }

    /// Write `config` as pretty TOML, creating parent directories
    pub async fn save(&self, config: &RelayConfig) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            value: self.file_path.display().to_string(),
            reason: e.to_string(),
        })?;

        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|source| ConfigError::Read {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }
        }

        fs::write(&self.file_path, content)
            .await
            .map_err(|source| ConfigError::Read {
                path: self.file_path.clone(),
                source,
            })?;

        info!("Saved config to file: {}", self.file_path.display());
        Ok(())
    }
}

/// Environment variable overrides for non-secret settings
pub struct EnvLoader {
    prefix: String,
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(env_vars::PREFIX.to_string())
    }
}

impl EnvLoader {
    pub fn new(prefix: String) -> Self {
        Self { prefix }
    }

    /// Apply `<PREFIX>*` variables on top of `config`.
    ///
    /// Unlike secrets, a present-but-unparsable override is an error rather
    /// than silently ignored.
    pub fn apply_env_overrides(&self, mut config: RelayConfig) -> Result<RelayConfig, ConfigError> {
        if let Some(bind) = self.var("BIND") {
            debug!("Applied env override: server.bind = {}", bind);
            config.server.bind = bind;
        }

        if let Some(secs) = self.parsed::<u64>("POLL_INTERVAL_SECS")? {
            config.monitor.poll_interval_secs = secs;
            debug!("Applied env override: monitor.poll_interval_secs = {}", secs);
        }

        if let Some(secs) = self.parsed::<u64>("POLL_JITTER_SECS")? {
            config.monitor.poll_jitter_secs = secs;
            debug!("Applied env override: monitor.poll_jitter_secs = {}", secs);
        }

        if let Some(max) = self.parsed::<usize>("MAX_MONITORS")? {
            config.monitor.max_monitors = max;
            debug!("Applied env override: monitor.max_monitors = {}", max);
        }

        if let Some(ack) = self.parsed::<bool>("ACKNOWLEDGE")? {
            config.commands.acknowledge = ack;
            debug!("Applied env override: commands.acknowledge = {}", ack);
        }

        if let Some(base) = self.var("BOARD_API_BASE") {
            debug!("Applied env override: api.board_api_base = {}", base);
            config.api.board_api_base = base;
        }

        if let Some(base) = self.var("MESSAGING_API_BASE") {
            debug!("Applied env override: api.messaging_api_base = {}", base);
            config.api.messaging_api_base = base;
        }

        Ok(config)
    }

    fn var(&self, name: &str) -> Option<String> {
        env::var(format!("{}{}", self.prefix, name))
            .ok()
            .filter(|v| !v.is_empty())
    }

    fn parsed<T: FromStr>(&self, name: &str) -> Result<Option<T>, ConfigError> {
        match self.var(name) {
            None => Ok(None),
            Some(raw) => raw.parse::<T>().map(Some).map_err(|_| ConfigError::InvalidValue {
                field: format!("{}{}", self.prefix, name),
                value: raw,
                reason: format!("expected {}", std::any::type_name::<T>()),
            }),
        }
    }
}
