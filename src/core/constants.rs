/// String constants shared across the relay.
///
/// Environment variable names, default endpoints and the fixed chat texts
/// live here so the server, config loader and tests agree on them.

/// Environment variables holding secrets and the target board
pub mod env_vars {
    pub const BOARD_TOKEN: &str = "TOKEN_MIRO";
    pub const BOARD_ID: &str = "BOARD_ID";
    pub const BOT_TOKEN: &str = "TOKEN_BOT";

    /// Prefix for non-secret setting overrides
    pub const PREFIX: &str = "BOARDRELAY_";
}

/// Default endpoints and listener settings
pub mod defaults {
    pub const BIND_ADDR: &str = "0.0.0.0:7000";
    pub const BOARD_API_BASE: &str = "https://api.miro.com/v1";
    pub const MESSAGING_API_BASE: &str = "https://api.telegram.org";
    pub const CONFIG_FILE: &str = "boardrelay.toml";
    pub const POLL_INTERVAL_SECS: u64 = 600;
    pub const MAX_MONITORS: usize = 64;
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
}

/// Inbound chat commands, matched exactly
pub mod commands {
    pub const START: &str = "/start";
    pub const STOP: &str = "/stop";
    pub const HELP: &str = "/help";
}

/// Fixed outbound chat texts
pub mod messages {
    pub const HELP: &str = "Bot will inform you about any changes on a board.\n\
        To start monitoring a board type /start.\n\
        To stop monitoring a board type /stop.";

    pub fn changes_settled(name: &str, link: &str) -> String {
        format!("On board {name} changes were made: {link}")
    }

    pub fn started(name: &str) -> String {
        format!("Started monitoring board {name}")
    }

    pub fn stopped(name: &str) -> String {
        format!("Stopped monitoring board {name}")
    }

    pub fn command_failed(command: &str, reason: &str) -> String {
        format!("Could not run {command}: {reason}")
    }
}
