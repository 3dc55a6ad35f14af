//! Scheduled wake-ups for the countdown: a one-shot deadline and a periodic tick

use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::{
    sync::mpsc,
    time::{interval_at, sleep, Instant},
};
use tracing::debug;

use crate::services::Clock;
use super::TaskHandle;

/// Period of the display-refresh tick
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WakeUpKind {
    Deadline,
    Tick,
}

impl WakeUpKind {
    pub fn name(&self) -> &'static str {
        match self {
            WakeUpKind::Deadline => "countdown-timer",
            WakeUpKind::Tick => "timer-tick",
        }
    }
}

/// A fired wake-up as delivered to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeUp {
    /// The deadline registered for the countdown ending at `end_time`
    Deadline { end_time: i64 },
    Tick,
}

impl WakeUp {
    pub fn kind(&self) -> WakeUpKind {
        match self {
            WakeUp::Deadline { .. } => WakeUpKind::Deadline,
            WakeUp::Tick => WakeUpKind::Tick,
        }
    }
}

/// Registers and cancels named wake-ups.
///
/// Registering a kind that is already pending replaces it.
pub trait Scheduler: Send {
    fn schedule_deadline(&mut self, end_time: i64);
    fn schedule_tick(&mut self, period: Duration);
    fn cancel(&mut self, kind: WakeUpKind);

    fn cancel_all(&mut self) {
        self.cancel(WakeUpKind::Deadline);
        self.cancel(WakeUpKind::Tick);
    }
}

/// Scheduler backed by tokio timers; fired wake-ups arrive on a channel
pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<WakeUp>,
    clock: Arc<dyn Clock>,
    tasks: HashMap<WakeUpKind, TaskHandle>,
}

impl TokioScheduler {
    pub fn new(clock: Arc<dyn Clock>) -> (Self, mpsc::UnboundedReceiver<WakeUp>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            tx,
            clock,
            tasks: HashMap::new(),
        };
        (scheduler, rx)
    }

    #[cfg(test)]
    fn is_pending(&self, kind: WakeUpKind) -> bool {
        self.tasks.get(&kind).map(TaskHandle::is_active).unwrap_or(false)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_deadline(&mut self, end_time: i64) {
        let delay_ms = end_time.saturating_sub(self.clock.now_ms()).max(0) as u64;
        debug!("Scheduling {} in {}ms", WakeUpKind::Deadline.name(), delay_ms);

        let tx = self.tx.clone();
        let handle = TaskHandle::spawn(async move {
            sleep(Duration::from_millis(delay_ms)).await;
            let _ = tx.send(WakeUp::Deadline { end_time });
        });
        self.tasks.insert(WakeUpKind::Deadline, handle);
    }

    fn schedule_tick(&mut self, period: Duration) {
        debug!("Scheduling {} every {:?}", WakeUpKind::Tick.name(), period);

        let tx = self.tx.clone();
        let handle = TaskHandle::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            loop {
                ticks.tick().await;
                if tx.send(WakeUp::Tick).is_err() {
                    break;
                }
            }
        });
        self.tasks.insert(WakeUpKind::Tick, handle);
    }

    fn cancel(&mut self, kind: WakeUpKind) {
        if let Some(mut handle) = self.tasks.remove(&kind) {
            handle.cancel();
            debug!("Cancelled {}", kind.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ManualClock;

    #[tokio::test(start_paused = true)]
    async fn deadline_fires_once_at_end_time() {
        let clock = ManualClock::at(10_000);
        let (mut scheduler, mut rx) = TokioScheduler::new(Arc::new(clock));

        scheduler.schedule_deadline(13_000);
        sleep(Duration::from_millis(2_900)).await;
        assert!(rx.try_recv().is_err());

        sleep(Duration::from_millis(200)).await;
        assert_eq!(rx.try_recv().unwrap(), WakeUp::Deadline { end_time: 13_000 });
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn past_deadline_fires_immediately() {
        let (mut scheduler, mut rx) = TokioScheduler::new(Arc::new(ManualClock::at(5_000)));
        scheduler.schedule_deadline(1_000);
        assert_eq!(rx.recv().await, Some(WakeUp::Deadline { end_time: 1_000 }));
    }

    #[tokio::test(start_paused = true)]
    async fn tick_repeats_until_cancelled() {
        let (mut scheduler, mut rx) = TokioScheduler::new(Arc::new(ManualClock::at(0)));

        scheduler.schedule_tick(TICK_PERIOD);
        sleep(Duration::from_millis(3_500)).await;
        assert!(scheduler.is_pending(WakeUpKind::Tick));

        scheduler.cancel(WakeUpKind::Tick);
        scheduler.cancel(WakeUpKind::Tick);
        sleep(Duration::from_secs(3)).await;

        let mut ticks = 0;
        while rx.try_recv().is_ok() {
            ticks += 1;
        }
        assert_eq!(ticks, 3);
        assert!(!scheduler.is_pending(WakeUpKind::Tick));
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_replaces_pending_deadline() {
        let (mut scheduler, mut rx) = TokioScheduler::new(Arc::new(ManualClock::at(0)));

        scheduler.schedule_deadline(1_000);
        scheduler.schedule_deadline(5_000);
        sleep(Duration::from_secs(6)).await;

        assert_eq!(rx.try_recv().unwrap(), WakeUp::Deadline { end_time: 5_000 });
        assert!(rx.try_recv().is_err());
    }
}
