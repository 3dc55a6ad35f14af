//! Delivers fired wake-ups to the controller

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::state::AppState;
use super::WakeUp;

/// Background task that drains the scheduler channel until every sender is gone
pub async fn wake_up_dispatch_task(state: Arc<AppState>, mut wake_ups: mpsc::UnboundedReceiver<WakeUp>) {
    info!("Starting wake-up dispatch task");

    while let Some(wake_up) = wake_ups.recv().await {
        debug!("Wake-up fired: {}", wake_up.kind().name());
        if let Err(e) = state.handle_wake_up(wake_up) {
            error!("Failed to handle {}: {}", wake_up.kind().name(), e);
        }
    }

    info!("Wake-up dispatch task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::{
        services::{BadgeIndicator, ManualClock},
        state::{
            controller::tests::RecordingNotifier, Capabilities, Command, Controller, MemoryStore,
        },
        tasks::TokioScheduler,
    };

    #[tokio::test(start_paused = true)]
    async fn scheduled_deadline_finishes_the_countdown() {
        let clock = ManualClock::at(0);
        let badge = Arc::new(BadgeIndicator::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let (scheduler, wake_ups) = TokioScheduler::new(Arc::new(clock.clone()));
        let mut controller = Controller::new(Capabilities {
            store: Box::new(MemoryStore::new()),
            scheduler: Box::new(scheduler),
            notifier: notifier.clone(),
            badge: badge.clone(),
            clock: Arc::new(clock),
        });
        controller.init();
        let state = Arc::new(AppState::new(
            controller,
            None,
            badge,
            notifier.clone(),
            0,
            "127.0.0.1".to_string(),
        ));
        tokio::spawn(wake_up_dispatch_task(Arc::clone(&state), wake_ups));

        state.execute(Command::Start { seconds: 5 }).unwrap();
        tokio::time::sleep(Duration::from_millis(4_500)).await;
        assert!(state.get_timer_state().unwrap().is_running);

        tokio::time::sleep(Duration::from_secs(1)).await;
        let finished = state.get_timer_state().unwrap();
        assert!(finished.is_finished);
        assert_eq!(finished.remaining_seconds, 0);
        assert_eq!(notifier.shown.lock().unwrap().len(), 1);
        assert!(state.badge().is_some());
    }
}
