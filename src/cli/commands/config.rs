use anyhow::{bail, Result};
use async_trait::async_trait;
use std::path::PathBuf;

use crate::cli::args::ConfigAction;
use crate::cli::commands::Command;
use crate::core::config::{EnvSecrets, FileLoader, RelayConfig, SecretSource};
use crate::core::constants::{defaults, env_vars};

pub struct ConfigCommand {
    action: ConfigAction,
}

impl ConfigCommand {
    pub fn new(action: ConfigAction) -> Self {
        Self { action }
    }
}

#[async_trait]
impl Command for ConfigCommand {
    async fn execute(&self) -> Result<()> {
        match &self.action {
            ConfigAction::Init { path } => {
                let path = path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(defaults::CONFIG_FILE));
                let loader = FileLoader::new(path);
                if loader.exists() {
                    bail!(
                        "{} already exists; remove it first to start over",
                        loader.file_path().display()
                    );
                }
                loader.save(&RelayConfig::default()).await?;
                println!("Configuration initialized at {}", loader.file_path().display());
            }

            ConfigAction::Show { config } => {
                let config = RelayConfig::load(config.as_deref()).await?;
                println!("{}", toml::to_string_pretty(&config)?);
                println!("{}", describe_secrets(&EnvSecrets));
            }
        }

        Ok(())
    }
}

/// Secret presence only, never values
fn describe_secrets(secrets: &dyn SecretSource) -> String {
    [env_vars::BOARD_ID, env_vars::BOARD_TOKEN, env_vars::BOT_TOKEN]
        .iter()
        .map(|key| {
            let state = if secrets.get(key).is_some() { "set" } else { "unset" };
            format!("# {key}: {state}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
