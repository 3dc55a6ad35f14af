//! Where a timer window sends its commands

use std::{future::Future, sync::Arc};
use anyhow::bail;

use crate::{
    services::BadgeState,
    state::{AppState, Command, Reply, TimerState},
};

/// Command sink for a view: an in-process controller or a remote one
pub trait TimerBackend: Send + Sync {
    fn execute(&self, command: Command) -> impl Future<Output = anyhow::Result<Reply>> + Send;
    /// Badge the controller is currently showing
    fn badge(&self) -> impl Future<Output = anyhow::Result<Option<BadgeState>>> + Send;
}

/// The view hosting the controller itself
impl TimerBackend for Arc<AppState> {
    fn execute(&self, command: Command) -> impl Future<Output = anyhow::Result<Reply>> + Send {
        let result = AppState::execute(self, command).map_err(anyhow::Error::msg);
        std::future::ready(result)
    }

    fn badge(&self) -> impl Future<Output = anyhow::Result<Option<BadgeState>>> + Send {
        std::future::ready(Ok(AppState::badge(self)))
    }
}

pub trait TimerBackendExt: TimerBackend {
    /// Fetch the authoritative state
    fn get_state(&self) -> impl Future<Output = anyhow::Result<TimerState>> + Send {
        async move {
            match self.execute(Command::GetState).await? {
                Reply::State(state) => Ok(state),
                Reply::Ack { success } => bail!("Expected timer state, got acknowledgement ({})", success),
            }
        }
    }

    /// Run a mutating command, failing when it is not acknowledged
    fn send(&self, command: Command) -> impl Future<Output = anyhow::Result<()>> + Send {
        async move {
            let action = command.action();
            match self.execute(command).await? {
                Reply::Ack { success: true } => Ok(()),
                other => bail!("{} was not acknowledged: {:?}", action, other),
            }
        }
    }
}

impl<B: TimerBackend> TimerBackendExt for B {}
