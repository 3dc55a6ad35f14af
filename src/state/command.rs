//! Command surface shared by the HTTP API, the remote client and the view

use serde::{Deserialize, Serialize};

use super::TimerState;

/// A request to the controller, tagged by `action`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    GetState,
    Start { seconds: u64 },
    Pause,
    Resume,
    Stop,
    Dismiss,
    UpdateInputs { minutes: u64, seconds: u64 },
}

impl Command {
    pub fn action(&self) -> &'static str {
        match self {
            Command::GetState => "getState",
            Command::Start { .. } => "start",
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::Stop => "stop",
            Command::Dismiss => "dismiss",
            Command::UpdateInputs { .. } => "updateInputs",
        }
    }

    /// Whether executing the command may change the stored state
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Command::GetState)
    }
}

/// Controller answer: an acknowledgement or the full state for `getState`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    Ack { success: bool },
    State(TimerState),
}

impl Reply {
    pub fn ok() -> Self {
        Reply::Ack { success: true }
    }

    pub fn rejected() -> Self {
        Reply::Ack { success: false }
    }
}
