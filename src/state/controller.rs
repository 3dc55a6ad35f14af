//! Countdown controller: owns the canonical timer state and arbitrates commands

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    services::{
        Badge, Clock, Notification, Notifier, ALERT_COLOR, ALERT_TEXT, COMPLETION_ID,
    },
    tasks::{Scheduler, WakeUp, TICK_PERIOD},
};
use super::{
    command::{Command, Reply},
    store::StateStore,
    timer_state::effective_duration,
    Phase, TimerState,
};

/// Host capabilities the controller drives
pub struct Capabilities {
    pub store: Box<dyn StateStore>,
    pub scheduler: Box<dyn Scheduler>,
    pub notifier: Arc<dyn Notifier>,
    pub badge: Arc<dyn Badge>,
    pub clock: Arc<dyn Clock>,
}

/// Single writer of the persisted `TimerState`.
///
/// Every operation reads the stored record, applies one transition and writes
/// the whole record back. Scheduled wake-ups are cancelled before any state
/// change that ends a running countdown.
pub struct Controller {
    store: Box<dyn StateStore>,
    scheduler: Box<dyn Scheduler>,
    notifier: Arc<dyn Notifier>,
    badge: Arc<dyn Badge>,
    clock: Arc<dyn Clock>,
}

impl Controller {
    pub fn new(capabilities: Capabilities) -> Self {
        let Capabilities { store, scheduler, notifier, badge, clock } = capabilities;
        Self { store, scheduler, notifier, badge, clock }
    }

    /// Write defaults on first run and re-arm wake-ups for a countdown that was
    /// running when the process last exited
    pub fn init(&mut self) -> TimerState {
        let state = match self.store.load() {
            Ok(Some(state)) => state,
            Ok(None) => {
                info!("No stored timer state, writing defaults");
                let state = TimerState::new();
                self.write(&state);
                state
            }
            Err(e) => {
                warn!("Failed to load timer state, using defaults: {:#}", e);
                TimerState::new()
            }
        };

        if let (true, Some(end_time)) = (state.is_running, state.end_time) {
            info!("Resuming countdown ending at {}", end_time);
            self.scheduler.schedule_deadline(end_time);
            self.scheduler.schedule_tick(TICK_PERIOD);
        }
        state
    }

    /// Current state with the remaining time recomputed from the deadline
    pub fn get_state(&self) -> TimerState {
        self.read().live(self.clock.now_ms())
    }

    pub fn start(&mut self, total_seconds: u64) -> TimerState {
        let total_seconds = effective_duration(total_seconds);
        let mut state = self.read();
        let end_time = state.run_for(total_seconds, self.clock.now_ms());
        self.write(&state);

        self.scheduler.schedule_deadline(end_time);
        self.scheduler.schedule_tick(TICK_PERIOD);
        self.clear_alert();

        info!("Countdown started: {}s", total_seconds);
        state
    }

    pub fn pause(&mut self) -> TimerState {
        let mut state = self.read();
        if state.phase() != Phase::Running {
            debug!("Pause ignored in {} state", state.phase().as_str());
            return state.live(self.clock.now_ms());
        }

        self.scheduler.cancel_all();
        state.pause_at(self.clock.now_ms());
        self.write(&state);

        info!("Countdown paused with {}s left", state.remaining_seconds);
        state
    }

    pub fn resume(&mut self) -> TimerState {
        let state = self.read();
        if state.phase() != Phase::Paused || state.remaining_seconds == 0 {
            debug!("Resume ignored in {} state", state.phase().as_str());
            return state.live(self.clock.now_ms());
        }
        self.start(state.remaining_seconds)
    }

    /// End the countdown and reload the configured duration
    pub fn stop(&mut self) -> TimerState {
        self.scheduler.cancel_all();

        let mut state = self.read();
        state.reset();
        self.write(&state);
        self.clear_alert();

        info!("Countdown stopped, reset to {}s", state.remaining_seconds);
        state
    }

    /// Acknowledge a finished countdown and go back to idle
    pub fn dismiss(&mut self) -> TimerState {
        info!("Alarm dismissed");
        self.stop()
    }

    /// Remember the configured duration without touching an active countdown
    pub fn update_inputs(&mut self, minutes: u64, seconds: u64) -> TimerState {
        let mut state = self.read();
        state.input_minutes = minutes;
        state.input_seconds = Some(seconds);
        if state.phase() == Phase::Idle {
            state.remaining_seconds = state.configured_seconds();
        }
        self.write(&state);

        debug!("Inputs updated to {}m {}s", minutes, seconds);
        state.live(self.clock.now_ms())
    }

    /// React to a wake-up delivered by the scheduler
    pub fn on_scheduled_fire(&mut self, wake_up: WakeUp) -> TimerState {
        let mut state = self.read();

        match wake_up {
            WakeUp::Deadline { end_time } => {
                if !state.is_running || state.end_time != Some(end_time) {
                    debug!("Ignoring stale deadline for {}", end_time);
                    return state.live(self.clock.now_ms());
                }
                self.finish(state)
            }
            WakeUp::Tick => {
                if state.is_running && state.end_time.is_some() {
                    state.remaining_seconds = state.remaining_at(self.clock.now_ms());
                    self.write(&state);
                    debug!("Tick: {}s left", state.remaining_seconds);
                }
                state
            }
        }
    }

    /// Run one command from the message surface
    pub fn execute(&mut self, command: Command) -> Reply {
        match command {
            Command::GetState => return Reply::State(self.get_state()),
            Command::Start { seconds } => self.start(seconds),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::Stop => self.stop(),
            Command::Dismiss => self.dismiss(),
            Command::UpdateInputs { minutes, seconds } => self.update_inputs(minutes, seconds),
        };
        Reply::ok()
    }

    fn finish(&mut self, mut state: TimerState) -> TimerState {
        self.scheduler.cancel_all();
        state.finish();
        self.write(&state);

        if let Err(e) = self.notifier.show(&Notification::timer_finished()) {
            warn!("Failed to raise completion notification: {}", e);
        }
        if let Err(e) = self.badge.set(ALERT_TEXT, ALERT_COLOR) {
            warn!("Failed to set badge: {}", e);
        }

        info!("Countdown finished");
        state
    }

    fn clear_alert(&self) {
        if let Err(e) = self.badge.clear() {
            warn!("Failed to clear badge: {}", e);
        }
        if let Err(e) = self.notifier.clear(COMPLETION_ID) {
            warn!("Failed to clear notification: {}", e);
        }
    }

    fn read(&self) -> TimerState {
        match self.store.load() {
            Ok(Some(state)) => state,
            Ok(None) => TimerState::new(),
            Err(e) => {
                warn!("Failed to read timer state, using defaults: {:#}", e);
                TimerState::new()
            }
        }
    }

    fn write(&self, state: &TimerState) {
        debug_assert!(state.is_consistent(), "inconsistent timer state: {:?}", state);
        if let Err(e) = self.store.save(state) {
            warn!("Failed to persist timer state: {:#}", e);
        }
    }
}
