pub mod config;
pub mod constants;
pub mod error_recovery;
pub mod errors;
pub mod metrics;

pub use config::RelayConfig;
pub use error_recovery::RetryPolicy;
pub use errors::{ConfigError, DecodeError, RelayError, RelayResult, TransportError};
pub use metrics::RelayMetrics;
