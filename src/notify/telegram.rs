use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::{ChatId, Notifier, OutboundMessage};
use crate::core::config::{ApiConfig, SecretSource};
use crate::core::constants::env_vars;
use crate::core::errors::{ConfigError, RelayError, TransportError};

/// Telegram Bot API `sendMessage` notifier.
///
/// The bot token is looked up on every send so a missing token only fails
/// the message that needed it.
pub struct TelegramNotifier {
    http: Client,
    api_base: String,
    secrets: Arc<dyn SecretSource>,
}

impl TelegramNotifier {
    pub fn new(
        api_base: impl Into<String>,
        timeout: Duration,
        secrets: Arc<dyn SecretSource>,
    ) -> Result<Self, RelayError> {
        let http = Client::builder().timeout(timeout).build().map_err(|e| {
            ConfigError::InvalidValue {
                field: "api.request_timeout_secs".to_string(),
                value: format!("{timeout:?}"),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            secrets,
        })
    }

    pub fn from_config(config: &ApiConfig, secrets: Arc<dyn SecretSource>) -> Result<Self, RelayError> {
        Self::new(config.messaging_api_base.clone(), config.request_timeout(), secrets)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, chat_id: ChatId, text: &str) -> Result<(), RelayError> {
        let token = self.secrets.bot_token().ok_or_else(|| ConfigError::Missing {
            field: "messaging token".to_string(),
            env_var: env_vars::BOT_TOKEN.to_string(),
        })?;

        let message = OutboundMessage {
            chat_id,
            text: text.to_string(),
        };
        debug!("Sending message to chat {}: {}", chat_id, text);

        let url = format!("{}/bot{}/sendMessage", self.api_base, token.expose());
        // The URL embeds the token; errors name the endpoint only.
        let endpoint = "sendMessage".to_string();

        let response = self
            .http
            .post(&url)
            .json(&message)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                endpoint: endpoint.clone(),
                source: source.without_url(),
            })?;

        if response.status() != StatusCode::OK {
            return Err(TransportError::Status {
                endpoint,
                status: response.status().as_u16(),
            }
            .into());
        }

        info!("Delivered message to chat {}", chat_id);
        Ok(())
    }
}
