use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::task::{MonitorExit, MonitorState, MonitorTask};
use super::MonitorSettings;
use crate::board::{BoardApi, BoardInfo};
use crate::core::config::AccessToken;
use crate::core::constants::env_vars;
use crate::core::errors::{ConfigError, RelayError, RelayResult};
use crate::core::metrics::RelayMetrics;
use crate::notify::{ChatId, Notifier};

/// One monitored board
struct MonitorEntry {
    info: BoardInfo,
    chat_id: ChatId,
    started_at: DateTime<Utc>,
    generation: u64,
    state: watch::Receiver<MonitorState>,
    stop: oneshot::Sender<()>,
    completion: JoinHandle<MonitorExit>,
}

#[derive(Default)]
struct MonitorTable {
    entries: HashMap<String, MonitorEntry>,
    next_generation: u64,
}

/// Point-in-time view of a monitored board
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorStatus {
    pub board_id: String,
    pub name: String,
    pub link: String,
    pub chat_id: ChatId,
    pub state: MonitorState,
    pub started_at: DateTime<Utc>,
}

/// Handle to a stopped monitor's task, awaitable for its exit
pub struct MonitorCompletion {
    pub board_id: String,
    pub info: BoardInfo,
    handle: JoinHandle<MonitorExit>,
}

impl MonitorCompletion {
    pub async fn wait(self) -> MonitorExit {
        match self.handle.await {
            Ok(exit) => exit,
            Err(err) => {
                error!("Monitor task for board {} aborted: {}", self.board_id, err);
                MonitorExit::Aborted
            }
        }
    }
}

/// Table of active monitor tasks, keyed by board id.
///
/// A single mutex guards the table and is held across duplicate checks,
/// insertion, spawning and stop dispatch, so `stop` never races a `start`
/// for the same board that is still registering.
pub struct MonitorRegistry {
    table: Arc<Mutex<MonitorTable>>,
    board: Arc<dyn BoardApi>,
    notifier: Arc<dyn Notifier>,
    settings: MonitorSettings,
    metrics: Arc<RelayMetrics>,
}

impl MonitorRegistry {
    pub fn new(
        board: Arc<dyn BoardApi>,
        notifier: Arc<dyn Notifier>,
        settings: MonitorSettings,
        metrics: Arc<RelayMetrics>,
    ) -> Self {
        Self {
            table: Arc::new(Mutex::new(MonitorTable::default())),
            board,
            notifier,
            settings,
            metrics,
        }
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    pub fn metrics(&self) -> &Arc<RelayMetrics> {
        &self.metrics
    }

    /// Start monitoring `board_id`, notifying `chat_id` when edits settle.
    ///
    /// Rejects a board that is already monitored; the running task is left
    /// untouched. Board metadata is fetched before the task is registered, so
    /// a board that cannot be read never gets an entry.
    pub async fn start(
        &self,
        board_id: &str,
        token: AccessToken,
        chat_id: ChatId,
    ) -> RelayResult<BoardInfo> {
        if board_id.trim().is_empty() {
            return Err(missing("board id", env_vars::BOARD_ID));
        }
        if token.is_empty() {
            return Err(missing("board access token", env_vars::BOARD_TOKEN));
        }

        let mut table = self.table.lock().await;

        if table.entries.contains_key(board_id) {
            return Err(RelayError::AlreadyMonitoring {
                board_id: board_id.to_string(),
            });
        }
        if table.entries.len() >= self.settings.max_monitors {
            warn!(
                "Refusing to monitor board {}: {} boards already monitored",
                board_id,
                table.entries.len()
            );
            return Err(RelayError::CapacityExceeded {
                limit: self.settings.max_monitors,
            });
        }

        let info = self.board.fetch_info(board_id, &token).await?;

        let generation = table.next_generation;
        table.next_generation += 1;

        let (stop_tx, stop_rx) = oneshot::channel();
        let (state_tx, state_rx) = watch::channel(MonitorState::Polling);

        let task = MonitorTask {
            board_id: board_id.to_string(),
            token,
            chat_id,
            info: info.clone(),
            board: Arc::clone(&self.board),
            notifier: Arc::clone(&self.notifier),
            settings: self.settings.clone(),
            metrics: Arc::clone(&self.metrics),
            state: state_tx,
        };

        let completion = tokio::spawn(supervise(
            task,
            stop_rx,
            Arc::clone(&self.table),
            Arc::clone(&self.metrics),
            board_id.to_string(),
            generation,
        ));

        table.entries.insert(
            board_id.to_string(),
            MonitorEntry {
                info: info.clone(),
                chat_id,
                started_at: Utc::now(),
                generation,
                state: state_rx,
                stop: stop_tx,
                completion,
            },
        );
        self.metrics.active_monitors.set(table.entries.len() as i64);

        info!("Start monitoring board {} (ID: {})", info.name, board_id);
        Ok(info)
    }

    /// Stop monitoring `board_id`.
    ///
    /// The entry is removed immediately, so a second stop fails with
    /// `NotFound`. The task exits at its next checkpoint; await the returned
    /// completion to observe that.
    pub async fn stop(&self, board_id: &str) -> RelayResult<MonitorCompletion> {
        let mut table = self.table.lock().await;

        let entry = table
            .entries
            .remove(board_id)
            .ok_or_else(|| RelayError::NotFound {
                board_id: board_id.to_string(),
            })?;
        self.metrics.active_monitors.set(table.entries.len() as i64);

        if entry.stop.send(()).is_err() {
            // The task already returned; its supervisor is waiting on this lock.
            warn!("Monitor task for board {} had already exited", board_id);
        }

        info!("Stop monitoring board {} (ID: {})", entry.info.name, board_id);
        Ok(MonitorCompletion {
            board_id: board_id.to_string(),
            info: entry.info,
            handle: entry.completion,
        })
    }

    /// Cached metadata of a monitored board
    pub async fn info(&self, board_id: &str) -> Option<BoardInfo> {
        let table = self.table.lock().await;
        table.entries.get(board_id).map(|entry| entry.info.clone())
    }

    pub async fn is_monitoring(&self, board_id: &str) -> bool {
        self.table.lock().await.entries.contains_key(board_id)
    }

    pub async fn active_count(&self) -> usize {
        self.table.lock().await.entries.len()
    }

    /// Every monitored board, sorted by id
    pub async fn list(&self) -> Vec<MonitorStatus> {
        let table = self.table.lock().await;
        let mut statuses: Vec<MonitorStatus> = table
            .entries
            .iter()
            .map(|(board_id, entry)| MonitorStatus {
                board_id: board_id.clone(),
                name: entry.info.name.clone(),
                link: entry.info.link.clone(),
                chat_id: entry.chat_id,
                state: *entry.state.borrow(),
                started_at: entry.started_at,
            })
            .collect();
        statuses.sort_by(|a, b| a.board_id.cmp(&b.board_id));
        statuses
    }

    /// Stop every monitor and wait for all of them to exit
    pub async fn shutdown(&self) -> Vec<(String, MonitorExit)> {
        let board_ids: Vec<String> = {
            let table = self.table.lock().await;
            table.entries.keys().cloned().collect()
        };

        let mut completions = Vec::with_capacity(board_ids.len());
        for board_id in board_ids {
            // A task may have removed itself in the meantime.
            if let Ok(completion) = self.stop(&board_id).await {
                completions.push(completion);
            }
        }

        let mut exits = Vec::with_capacity(completions.len());
        for completion in completions {
            let board_id = completion.board_id.clone();
            exits.push((board_id, completion.wait().await));
        }

        info!("Stopped {} monitors", exits.len());
        exits
    }
}

/// Run a task, then drop its entry if the task ended on its own.
async fn supervise(
    task: MonitorTask,
    stop: oneshot::Receiver<()>,
    table: Arc<Mutex<MonitorTable>>,
    metrics: Arc<RelayMetrics>,
    board_id: String,
    generation: u64,
) -> MonitorExit {
    let exit = task.run(stop).await;

    let mut table = table.lock().await;
    let owns_entry = table
        .entries
        .get(&board_id)
        .is_some_and(|entry| entry.generation == generation);
    if owns_entry {
        table.entries.remove(&board_id);
        metrics.active_monitors.set(table.entries.len() as i64);
        warn!("Removed monitor for board {} after it exited: {:?}", board_id, exit);
    }

    exit
}

fn missing(field: &str, env_var: &str) -> RelayError {
    ConfigError::Missing {
        field: field.to_string(),
        env_var: env_var.to_string(),
    }
    .into()
}
