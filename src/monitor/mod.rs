//! Per-board monitoring: change detection, the poll loop, and the registry
//! that starts and stops poll loops.

pub mod detector;
pub mod registry;
pub mod task;

pub use detector::{differs, is_settled, EditTracker, Transition};
pub use registry::{MonitorCompletion, MonitorRegistry, MonitorStatus};
pub use task::{MonitorExit, MonitorState};

use std::time::Duration;

use crate::core::config::RelayConfig;
use crate::core::constants::defaults;
use crate::core::error_recovery::RetryPolicy;

/// Runtime settings shared by every monitor task
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// Fixed delay before each fetch
    pub poll_interval: Duration,
    /// Upper bound of extra random delay per tick
    pub poll_jitter: Duration,
    /// Maximum number of concurrently monitored boards
    pub max_monitors: usize,
    /// Notification delivery retries
    pub retry: RetryPolicy,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(defaults::POLL_INTERVAL_SECS),
            poll_jitter: Duration::ZERO,
            max_monitors: defaults::MAX_MONITORS,
            retry: RetryPolicy::default(),
        }
    }
}

impl From<&RelayConfig> for MonitorSettings {
    fn from(config: &RelayConfig) -> Self {
        Self {
            poll_interval: config.monitor.poll_interval(),
            poll_jitter: config.monitor.poll_jitter(),
            max_monitors: config.monitor.max_monitors,
            retry: config.delivery.retry_policy(),
        }
    }
}
