use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::sync::{oneshot, watch};
use tracing::{debug, error, info, warn};

use super::detector::{EditTracker, Transition};
use super::MonitorSettings;
use crate::board::{BoardApi, BoardInfo, Snapshot};
use crate::core::config::AccessToken;
use crate::core::constants::messages;
use crate::core::errors::RelayError;
use crate::core::metrics::RelayMetrics;
use crate::notify::{ChatId, Notifier};

/// Where a monitor task is in its tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorState {
    Polling,
    Fetching,
    Comparing,
    Stopped,
}

/// Why a monitor task ended
#[derive(Debug)]
pub enum MonitorExit {
    /// The stop signal was observed
    Stopped,
    /// A settled-change notification could not be delivered
    DeliveryFailed(RelayError),
    /// The task panicked or was aborted by the runtime
    Aborted,
}

impl MonitorExit {
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

/// Long-lived poll loop bound to one board
pub(crate) struct MonitorTask {
    pub(crate) board_id: String,
    pub(crate) token: AccessToken,
    pub(crate) chat_id: ChatId,
    pub(crate) info: BoardInfo,
    pub(crate) board: Arc<dyn BoardApi>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) settings: MonitorSettings,
    pub(crate) metrics: Arc<RelayMetrics>,
    pub(crate) state: watch::Sender<MonitorState>,
}

impl MonitorTask {
    /// Poll until `stop` fires (or its sender is dropped) or delivery fails.
    ///
    /// The stop signal is checked while waiting for the next tick and again
    /// right after each fetch; an in-flight fetch is never cut short.
    pub async fn run(self, mut stop: oneshot::Receiver<()>) -> MonitorExit {
        info!(
            "Monitoring board {} ({}) for chat {}",
            self.info.name, self.board_id, self.chat_id
        );

        let initial = self.fetch().await;
        let mut tracker = EditTracker::new(initial);
        if !tracker.has_baseline() {
            warn!(
                "No initial snapshot for board {}; the next successful fetch becomes the baseline",
                self.board_id
            );
        }

        loop {
            self.set_state(MonitorState::Polling);
            let delay = self.next_delay();

            tokio::select! {
                biased;
                _ = &mut stop => break,
                _ = tokio::time::sleep(delay) => {}
            }

            self.set_state(MonitorState::Fetching);
            let snapshot = self.fetch().await;

            if stop_requested(&mut stop) {
                break;
            }

            // A failed fetch leaves the previous snapshot and flag untouched.
            let Some(snapshot) = snapshot else {
                continue;
            };

            self.set_state(MonitorState::Comparing);
            match tracker.observe(snapshot) {
                Transition::Settled => {
                    if let Err(err) = self.deliver().await {
                        error!(
                            "Giving up on board {} ({}): notification to chat {} failed: {}",
                            self.info.name, self.board_id, self.chat_id, err
                        );
                        self.metrics.delivery_failures_total.inc();
                        self.set_state(MonitorState::Stopped);
                        return MonitorExit::DeliveryFailed(err);
                    }
                }
                transition => {
                    debug!("Board {}: {:?}", self.board_id, transition);
                }
            }
        }

        self.set_state(MonitorState::Stopped);
        info!("Stopped monitoring board {} ({})", self.info.name, self.board_id);
        MonitorExit::Stopped
    }

    async fn fetch(&self) -> Option<Snapshot> {
        self.metrics.polls_total.inc();
        match self.board.fetch_snapshot(&self.board_id, &self.token).await {
            Ok(snapshot) => {
                debug!("Fetched {} bytes for board {}", snapshot.len(), self.board_id);
                Some(snapshot)
            }
            Err(err) => {
                warn!("Skipping tick for board {}: {}", self.board_id, err);
                self.metrics.fetch_failures_total.inc();
                None
            }
        }
    }

    async fn deliver(&self) -> Result<(), RelayError> {
        let text = messages::changes_settled(&self.info.name, &self.info.link);
        info!("{}", text);

        let notifier = &self.notifier;
        let chat_id = self.chat_id;
        let text = text.as_str();
        self.settings
            .retry
            .run("notification", move || notifier.notify(chat_id, text))
            .await?;

        self.metrics.notifications_total.inc();
        Ok(())
    }

    fn next_delay(&self) -> Duration {
        let jitter = self.settings.poll_jitter;
        if jitter.is_zero() {
            return self.settings.poll_interval;
        }
        let extra = rand::thread_rng().gen_range(0..=jitter.as_millis() as u64);
        self.settings.poll_interval + Duration::from_millis(extra)
    }

    fn set_state(&self, state: MonitorState) {
        // No receivers left just means nobody is watching the state.
        let _ = self.state.send(state);
    }
}

fn stop_requested(stop: &mut oneshot::Receiver<()>) -> bool {
    match stop.try_recv() {
        Ok(()) | Err(TryRecvError::Closed) => true,
        Err(TryRecvError::Empty) => false,
    }
}
