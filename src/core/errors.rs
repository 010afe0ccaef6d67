/// Domain-specific error types for boardrelay using thiserror
///
/// The taxonomy mirrors the failure classes of the relay: missing or invalid
/// configuration, operations on boards that are not monitored, transport
/// failures talking to the board or messaging APIs, and undecodable JSON.
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for boardrelay operations
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Board {board_id} is not being monitored")]
    NotFound { board_id: String },

    #[error("Board {board_id} is already being monitored")]
    AlreadyMonitoring { board_id: String },

    #[error("Monitor capacity of {limit} boards reached")]
    CapacityExceeded { limit: usize },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl RelayError {
    /// Whether retrying the same operation could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required configuration: {field} (set {env_var})")]
    Missing { field: String, env_var: String },

    #[error("Invalid configuration value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to read configuration file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors talking to the board or messaging APIs
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request to {endpoint} failed")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected status {status} from {endpoint}")]
    Status { endpoint: String, status: u16 },
}

/// Malformed payloads from a collaborator or an inbound request
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed JSON in {context}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing field '{field}' in {context}")]
    MissingField { context: String, field: String },
}

/// Result type alias for boardrelay operations
pub type RelayResult<T> = Result<T, RelayError>;
