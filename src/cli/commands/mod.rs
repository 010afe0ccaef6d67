use anyhow::Result;
use async_trait::async_trait;

pub mod config;
pub mod serve;

pub use config::ConfigCommand;
pub use serve::ServeCommand;

/// Trait for CLI command implementations
#[async_trait]
pub trait Command {
    /// Execute the command with the given arguments
    async fn execute(&self) -> Result<()>;
}
