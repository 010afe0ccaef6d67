use anyhow::Result;
use board_relay::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run_cli().await
}
