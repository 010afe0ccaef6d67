//! Board API collaborator: metadata and widget snapshots

pub mod client;
pub mod types;

pub use client::MiroClient;
pub use types::{BoardInfo, Snapshot};

use async_trait::async_trait;

use crate::core::config::AccessToken;
use crate::core::errors::RelayError;

/// Read access to a remote board
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BoardApi: Send + Sync {
    /// Fetch the board's display name and view link
    async fn fetch_info(&self, board_id: &str, token: &AccessToken) -> Result<BoardInfo, RelayError>;

    /// Fetch the board's current widgets as opaque bytes
    async fn fetch_snapshot(&self, board_id: &str, token: &AccessToken)
        -> Result<Snapshot, RelayError>;
}
