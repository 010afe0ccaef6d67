use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::types::Update;
use crate::core::config::SecretSource;
use crate::core::constants::{commands, env_vars, messages};
use crate::core::errors::RelayError;
use crate::monitor::MonitorRegistry;
use crate::notify::{ChatId, Notifier};

/// Chat command recognised by the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Help,
}

impl Command {
    /// Exact match on the whole message text
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            commands::START => Some(Self::Start),
            commands::STOP => Some(Self::Stop),
            commands::HELP => Some(Self::Help),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => commands::START,
            Self::Stop => commands::STOP,
            Self::Help => commands::HELP,
        }
    }
}

/// What became of one inbound update
#[derive(Debug)]
pub enum Handled {
    /// Body was not a valid update
    Malformed,
    /// No message or no recognised command
    Ignored,
    Executed(Command),
    Failed(Command, RelayError),
}

/// Turns webhook updates into registry operations
pub struct CommandRouter {
    registry: Arc<MonitorRegistry>,
    notifier: Arc<dyn Notifier>,
    secrets: Arc<dyn SecretSource>,
    acknowledge: bool,
}

impl CommandRouter {
    pub fn new(
        registry: Arc<MonitorRegistry>,
        notifier: Arc<dyn Notifier>,
        secrets: Arc<dyn SecretSource>,
        acknowledge: bool,
    ) -> Self {
        Self {
            registry,
            notifier,
            secrets,
            acknowledge,
        }
    }

    pub fn registry(&self) -> &Arc<MonitorRegistry> {
        &self.registry
    }

    /// Decode and execute one webhook body. Never fails: problems are logged
    /// and, with acknowledgments on, reported back to the chat.
    pub async fn handle_update(&self, body: &[u8]) -> Handled {
        let update = match Update::from_json(body) {
            Ok(update) => update,
            Err(err) => {
                error!("Dropping inbound update: {}", err);
                return Handled::Malformed;
            }
        };

        let Some((text, chat_id)) = update.text_and_chat() else {
            debug!("Ignoring update without a message");
            return Handled::Ignored;
        };
        let Some(command) = Command::parse(text) else {
            debug!("Ignoring message from chat {}", chat_id);
            return Handled::Ignored;
        };

        match self.dispatch(command, chat_id).await {
            Ok(()) => Handled::Executed(command),
            Err(err) => {
                error!("Command {} from chat {} failed: {}", command.as_str(), chat_id, err);
                if self.acknowledge {
                    let reply = messages::command_failed(command.as_str(), &err.to_string());
                    self.reply(chat_id, &reply).await;
                }
                Handled::Failed(command, err)
            }
        }
    }

    /// Execute a parsed command on behalf of `chat_id`
    pub async fn dispatch(&self, command: Command, chat_id: ChatId) -> Result<(), RelayError> {
        match command {
            Command::Start => {
                let target = self.secrets.board_target()?;
                let info = self
                    .registry
                    .start(&target.board_id, target.token, chat_id)
                    .await?;
                if self.acknowledge {
                    self.reply(chat_id, &messages::started(&info.name)).await;
                }
            }
            Command::Stop => {
                let board_id = self.secrets.require(env_vars::BOARD_ID, "board id")?;
                // The task winds down on its own; nothing here waits for it.
                let completion = self.registry.stop(&board_id).await?;
                if self.acknowledge {
                    self.reply(chat_id, &messages::stopped(&completion.info.name))
                        .await;
                }
            }
            Command::Help => {
                self.notifier.notify(chat_id, messages::HELP).await?;
                info!("Sent help to chat {}", chat_id);
            }
        }
        Ok(())
    }

    async fn reply(&self, chat_id: ChatId, text: &str) {
        if let Err(err) = self.notifier.notify(chat_id, text).await {
            warn!("Failed to reply to chat {}: {}", chat_id, err);
        }
    }
}
