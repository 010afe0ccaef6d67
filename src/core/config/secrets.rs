//! Secret lookup
//!
//! Secrets are resolved when a command runs, never cached in `RelayConfig`,
//! so rotating `TOKEN_MIRO` or `BOARD_ID` takes effect on the next `/start`.

use crate::core::constants::env_vars;
use crate::core::errors::ConfigError;
use std::collections::HashMap;
use std::fmt;

/// Bearer credential for an upstream API. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// The board a `/start` or `/stop` applies to, with the credential to read it
#[derive(Debug, Clone)]
pub struct BoardTarget {
    pub board_id: String,
    pub token: AccessToken,
}

/// Where secrets come from
pub trait SecretSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Resolve `BOARD_ID` and `TOKEN_MIRO`
    fn board_target(&self) -> Result<BoardTarget, ConfigError> {
        let board_id = self.require(env_vars::BOARD_ID, "board id")?;
        let token = self.require(env_vars::BOARD_TOKEN, "board access token")?;
        Ok(BoardTarget {
            board_id,
            token: AccessToken::new(token),
        })
    }

    fn bot_token(&self) -> Option<AccessToken> {
        self.get(env_vars::BOT_TOKEN).map(AccessToken::new)
    }

    fn require(&self, key: &str, field: &str) -> Result<String, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::Missing {
            field: field.to_string(),
            env_var: key.to_string(),
        })
    }
}

/// Process environment; empty values count as unset
pub struct EnvSecrets;

impl SecretSource for EnvSecrets {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .filter(|value| !value.trim().is_empty())
    }
}

impl SecretSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key)
            .filter(|value| !value.trim().is_empty())
            .cloned()
    }
}
