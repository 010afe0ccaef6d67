//! # boardrelay
//!
//! Watches Miro boards and tells a Telegram chat when an editing session has
//! finished.
//!
//! Each monitored board gets its own poll loop. A loop compares successive
//! widget snapshots byte for byte and sends one notification on the falling
//! edge: the tick after the board stopped changing. Monitoring is controlled
//! from the chat with `/start`, `/stop` and `/help`, delivered through an
//! HTTP webhook.
//!
//! ## Module Overview
//!
//! - [`board`] - Miro API client and snapshot types
//! - [`monitor`] - Change detection, poll loops and the monitor registry
//! - [`notify`] - Outbound Telegram messages
//! - [`server`] - Webhook, command routing and status endpoints
//! - [`cli`] - Command-line interface
//! - [`core`] - Configuration, errors, retry policy and metrics

/// Miro board API client
pub mod board;
/// Command-line interface and argument parsing
pub mod cli;
/// Configuration, errors, retries and metrics
pub mod core;
/// Per-board poll loops and their registry
pub mod monitor;
/// Chat notifications
pub mod notify;
/// HTTP control surface
pub mod server;

pub use board::{BoardApi, BoardInfo, MiroClient, Snapshot};
pub use cli::{run_cli, Cli};
pub use crate::core::config::{AccessToken, RelayConfig, SecretSource};
pub use crate::core::errors::{ConfigError, DecodeError, RelayError, RelayResult, TransportError};
pub use monitor::{MonitorCompletion, MonitorExit, MonitorRegistry, MonitorSettings, MonitorStatus};
pub use notify::{ChatId, Notifier, TelegramNotifier};
pub use server::{AppState, CommandRouter};
