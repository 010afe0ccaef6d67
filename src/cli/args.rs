use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure for boardrelay.
///
/// boardrelay watches Miro boards for finished editing sessions and reports
/// them to a Telegram chat. Monitoring is started and stopped from the chat
/// through the webhook served by `serve`.
///
/// # Examples
///
/// ```bash
/// # Serve the webhook with a 5 minute poll interval
/// boardrelay serve --interval 300
///
/// # Write the default configuration file
/// boardrelay config init
/// ```
#[derive(Parser)]
#[command(name = "boardrelay")]
#[command(about = "Relay finished Miro board edits to a Telegram chat")]
#[command(version)]
pub struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the webhook server and monitor boards on request
    Serve {
        /// Configuration file (default: ./boardrelay.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Listen address, overrides server.bind
        #[arg(long)]
        bind: Option<String>,

        /// Poll interval in seconds, overrides monitor.poll_interval_secs
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Write the default configuration file
    Init {
        /// Destination (default: ./boardrelay.toml)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Print the effective configuration
    Show {
        /// Configuration file (default: ./boardrelay.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
