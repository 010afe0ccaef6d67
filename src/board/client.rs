use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use super::{BoardApi, BoardInfo, Snapshot};
use crate::core::config::{AccessToken, ApiConfig};
use crate::core::errors::{ConfigError, RelayError, TransportError};

/// Miro REST client for board metadata and widgets
#[derive(Clone)]
pub struct MiroClient {
    http: Client,
    api_base: String,
}

impl MiroClient {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self, RelayError> {
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
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, RelayError> {
        Self::new(config.board_api_base.clone(), config.request_timeout())
    }

    fn board_url(&self, board_id: &str) -> String {
        format!("{}/boards/{}", self.api_base, board_id)
    }

    fn widgets_url(&self, board_id: &str) -> String {
        format!("{}/boards/{}/widgets/", self.api_base, board_id)
    }

    async fn get_bytes(&self, url: &str, token: &AccessToken) -> Result<Vec<u8>, RelayError> {
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(|source| TransportError::Request {
                endpoint: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(TransportError::Status {
                endpoint: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| TransportError::Request {
                endpoint: url.to_string(),
                source,
            })?;

        Ok(body.to_vec())
    }
}

#[async_trait]
impl BoardApi for MiroClient {
    async fn fetch_info(&self, board_id: &str, token: &AccessToken) -> Result<BoardInfo, RelayError> {
        let body = self.get_bytes(&self.board_url(board_id), token).await?;
        BoardInfo::from_json(&body)
    }

    async fn fetch_snapshot(
        &self,
        board_id: &str,
        token: &AccessToken,
    ) -> Result<Snapshot, RelayError> {
        let body = self.get_bytes(&self.widgets_url(board_id), token).await?;
        Ok(Snapshot::new(body))
    }
}
