//! Outbound chat notifications

pub mod telegram;

pub use telegram::TelegramNotifier;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::RelayError;

/// Telegram chat identifier
pub type ChatId = i64;

/// Body of a `sendMessage` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub chat_id: ChatId,
    pub text: String,
}

/// Delivers one text message to a chat
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Fails with a transport error on network failure or a non-200 response
    async fn notify(&self, chat_id: ChatId, text: &str) -> Result<(), RelayError>;
}
