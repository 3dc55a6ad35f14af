//! Window watch background task

use std::{sync::Arc, time::Duration};
use tokio::time::interval;
use tracing::{info, warn};

use crate::state::AppState;

/// How often the tracked window is checked for having been closed
pub const WINDOW_POLL_PERIOD: Duration = Duration::from_secs(2);

/// Background task that forgets the tracked window once it has been closed by any means
pub async fn window_watch_task(state: Arc<AppState>) {
    let Some(windows) = state.windows.as_ref() else {
        return;
    };
    info!("Starting window watch task");

    let mut ticks = interval(WINDOW_POLL_PERIOD);
    loop {
        ticks.tick().await;

        match windows.lock() {
            Ok(mut manager) => {
                manager.reap_closed();
            }
            Err(e) => warn!("Failed to lock window manager: {}", e),
        }
    }
}
