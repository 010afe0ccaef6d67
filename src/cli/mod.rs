//! Command-line entry point

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, ConfigAction};

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commands::{Command, ConfigCommand, ServeCommand};

pub async fn run_cli() -> Result<()> {
    // `.env` first so RUST_LOG and secrets from it are visible below.
    let dotenv_path = dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("board_relay={}", log_level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(path) = dotenv_path {
        debug!("Loaded environment from {}", path.display());
    }

    let command: Box<dyn Command> = match cli.command {
        Commands::Serve {
            config,
            bind,
            interval,
        } => Box::new(ServeCommand::new(config, bind, interval)),
        Commands::Config { action } => Box::new(ConfigCommand::new(action)),
    };

    command.execute().await
}
