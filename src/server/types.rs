use serde::{Deserialize, Serialize};

use crate::core::errors::{DecodeError, RelayError};
use crate::notify::ChatId;

/// Inbound webhook update. Only the fields the relay reads are modelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub text: Option<String>,
    pub chat: Chat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

impl Update {
    pub fn from_json(body: &[u8]) -> Result<Self, RelayError> {
        serde_json::from_slice(body).map_err(|source| {
            DecodeError::Json {
                context: "webhook update".to_string(),
                source,
            }
            .into()
        })
    }

    /// Message text and originating chat, when the update carries a message
    pub fn text_and_chat(&self) -> Option<(&str, ChatId)> {
        let message = self.message.as_ref()?;
        Some((message.text.as_deref().unwrap_or_default(), message.chat.id))
    }
}
