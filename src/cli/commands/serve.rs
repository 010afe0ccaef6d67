use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::board::{BoardApi, MiroClient};
use crate::cli::commands::Command;
use crate::core::config::{EnvSecrets, RelayConfig, SecretSource};
use crate::core::constants::env_vars;
use crate::core::metrics::RelayMetrics;
use crate::monitor::{MonitorRegistry, MonitorSettings};
use crate::notify::{Notifier, TelegramNotifier};
use crate::server::{self, AppState, CommandRouter};

pub struct ServeCommand {
    config_path: Option<PathBuf>,
    bind: Option<String>,
    interval: Option<u64>,
}

impl ServeCommand {
    pub fn new(config_path: Option<PathBuf>, bind: Option<String>, interval: Option<u64>) -> Self {
        Self {
            config_path,
            bind,
            interval,
        }
    }

    /// Effective configuration: file and environment, then command-line flags
    async fn load_config(&self) -> Result<RelayConfig> {
        let mut config = RelayConfig::load(self.config_path.as_deref())
            .await
            .context("Failed to load configuration")?;

        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if let Some(interval) = self.interval {
            config.monitor.poll_interval_secs = interval;
        }
        config.validate()?;

        Ok(config)
    }
}

#[async_trait]
impl Command for ServeCommand {
    async fn execute(&self) -> Result<()> {
        let config = self.load_config().await?;
        let addr = config.bind_addr()?;

        let secrets: Arc<dyn SecretSource> = Arc::new(EnvSecrets);
        warn_missing_secrets(secrets.as_ref());

        let metrics = Arc::new(RelayMetrics::new()?);
        let board: Arc<dyn BoardApi> = Arc::new(MiroClient::from_config(&config.api)?);
        let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::from_config(
            &config.api,
            Arc::clone(&secrets),
        )?);

        let registry = Arc::new(MonitorRegistry::new(
            board,
            Arc::clone(&notifier),
            MonitorSettings::from(&config),
            Arc::clone(&metrics),
        ));
        let router = Arc::new(CommandRouter::new(
            Arc::clone(&registry),
            notifier,
            secrets,
            config.commands.acknowledge,
        ));

        info!(
            "Polling every {}s, at most {} boards",
            config.monitor.poll_interval_secs, config.monitor.max_monitors
        );

        let state = AppState {
            router,
            registry: Arc::clone(&registry),
            metrics,
        };
        server::serve(addr, state, shutdown_signal())
            .await
            .with_context(|| format!("Server on {} failed", addr))?;

        let exits = registry.shutdown().await;
        info!("Shutdown complete, {} monitors stopped", exits.len());
        Ok(())
    }
}

/// Secrets are read per command, so a gap here is only a warning
fn warn_missing_secrets(secrets: &dyn SecretSource) {
    for key in [env_vars::BOARD_ID, env_vars::BOARD_TOKEN, env_vars::BOT_TOKEN] {
        if secrets.get(key).is_none() {
            warn!("{} is not set; commands that need it will fail", key);
        }
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down"),
        Err(err) => {
            error!("Unable to listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await;
        }
    }
}
