//! One timer window: local countdown, button state machine and alarm

use std::{sync::Arc, time::Duration};
use tracing::{debug, info, warn};

use crate::{
    services::{AlarmLoop, AlarmPlayer, BadgeState, Clock, MAX_REPETITIONS, REPEAT_PERIOD},
    state::{
        timer_state::{effective_duration, remaining_until, total_seconds},
        Command, Phase, TimerState, DEFAULT_SECONDS,
    },
};
use super::{
    backend::{TimerBackend, TimerBackendExt},
    format_time,
    presentation::Controls,
};

/// Period of the window's own redraw loop
pub const LOCAL_TICK: Duration = Duration::from_secs(1);
/// Period of the window's periodic save
pub const SAVE_PERIOD: Duration = Duration::from_secs(5);

/// Presentation and local animation for one open window.
///
/// The window keeps its own copy of the countdown so the display stays smooth
/// when the controller is slow to answer; the remaining time is always
/// recomputed from the deadline the controller reported.
pub struct TimerView<B> {
    backend: B,
    player: Arc<dyn AlarmPlayer>,
    clock: Arc<dyn Clock>,
    phase: Phase,
    minutes_input: String,
    seconds_input: String,
    remaining_seconds: u64,
    deadline_ms: Option<i64>,
    badge: Option<BadgeState>,
    alarm: AlarmLoop,
}

impl<B: TimerBackend> TimerView<B> {
    pub fn new(backend: B, player: Arc<dyn AlarmPlayer>, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            player,
            clock,
            phase: Phase::Idle,
            minutes_input: "0".to_string(),
            seconds_input: DEFAULT_SECONDS.to_string(),
            remaining_seconds: DEFAULT_SECONDS,
            deadline_ms: None,
            badge: None,
            alarm: AlarmLoop::idle(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn display(&self) -> String {
        format_time(self.remaining_seconds)
    }

    pub fn controls(&self) -> Controls {
        Controls::for_phase(self.phase)
    }

    pub fn inputs(&self) -> (&str, &str) {
        (&self.minutes_input, &self.seconds_input)
    }

    pub fn is_alarm_playing(&self) -> bool {
        self.alarm.is_playing()
    }

    pub fn badge(&self) -> Option<&BadgeState> {
        self.badge.as_ref()
    }

    /// Pick up the badge the controller shows; kept as-is when it can't be read
    pub async fn refresh_badge(&mut self) {
        match self.backend.badge().await {
            Ok(badge) => self.badge = badge,
            Err(e) => debug!("Failed to read badge: {:#}", e),
        }
    }

    /// Load the authoritative state, restoring inputs and any active countdown
    pub async fn load(&mut self) {
        match self.backend.get_state().await {
            Ok(state) => {
                self.minutes_input = state.input_minutes.to_string();
                self.seconds_input = state.input_seconds.unwrap_or(DEFAULT_SECONDS).to_string();
                self.apply(&state);
                self.refresh_badge().await;
                info!("Window loaded in {} state", self.phase.as_str());
            }
            Err(e) => {
                warn!("Failed to load timer state, showing defaults: {:#}", e);
                self.phase = Phase::Idle;
                self.deadline_ms = None;
                self.remaining_seconds = self.inputs_total();
            }
        }
    }

    /// Start button: fresh start from idle, resume from paused
    pub async fn press_start(&mut self) {
        let command = match self.phase {
            Phase::Idle => Command::Start { seconds: effective_duration(self.inputs_total()) },
            Phase::Paused => Command::Resume,
            Phase::Running | Phase::Finished => return,
        };
        self.alarm.cancel();
        self.run(command).await;
    }

    /// Stop button: pauses a running countdown, ends a paused one
    pub async fn press_stop(&mut self) {
        let command = match self.phase {
            Phase::Running => Command::Pause,
            Phase::Paused => Command::Stop,
            Phase::Idle | Phase::Finished => return,
        };
        self.run(command).await;
    }

    /// Dismiss button: silence the alarm and return to the input screen
    pub async fn press_dismiss(&mut self) {
        if self.phase != Phase::Finished {
            return;
        }
        self.alarm.cancel();
        self.run(Command::Dismiss).await;
    }

    /// Enter in either input field starts the countdown unless it is already running
    pub async fn key_enter(&mut self) {
        if matches!(self.phase, Phase::Idle | Phase::Paused) {
            self.press_start().await;
        }
    }

    /// Edit the duration fields; ignored while the inputs are locked
    pub async fn set_inputs(&mut self, minutes: &str, seconds: &str) -> bool {
        if !self.controls().inputs_enabled {
            debug!("Inputs are locked in {} state", self.phase.as_str());
            return false;
        }
        self.minutes_input = minutes.trim().to_string();
        self.seconds_input = seconds.trim().to_string();
        self.remaining_seconds = self.inputs_total();
        self.save().await;
        true
    }

    /// One step of the local redraw loop. Returns true when the countdown just finished.
    pub fn tick(&mut self) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        let Some(deadline) = self.deadline_ms else {
            return false;
        };

        self.remaining_seconds = remaining_until(deadline, self.clock.now_ms());
        if self.remaining_seconds == 0 {
            self.enter_finished();
            return true;
        }
        false
    }

    /// Persist the configured duration
    pub async fn save(&self) {
        let (minutes, seconds) = self.parsed_inputs();
        if let Err(e) = self.backend.send(Command::UpdateInputs { minutes, seconds }).await {
            warn!("Failed to save timer inputs: {:#}", e);
        }
    }

    /// Window is closing: silence the alarm and save
    pub async fn close(&mut self) {
        self.alarm.cancel();
        self.save().await;
        info!("Window closed");
    }

    /// One-line rendering of the whole window
    pub fn render(&self) -> String {
        let status = match self.phase {
            Phase::Finished => "TIME'S UP".to_string(),
            phase => phase.as_str().to_string(),
        };
        let badge = match &self.badge {
            Some(badge) => format!("[{}] ", badge.text),
            None => String::new(),
        };
        let inputs = if self.controls().inputs_enabled {
            format!("  set {}m {}s", self.minutes_input, self.seconds_input)
        } else {
            String::new()
        };
        format!(
            "{}{:>8}  {:<9}  {}{}",
            badge,
            self.display(),
            status,
            self.controls().describe(),
            inputs
        )
    }

    async fn run(&mut self, command: Command) {
        let action = command.action();
        if let Err(e) = self.backend.send(command).await {
            warn!("{} failed: {:#}", action, e);
            return;
        }
        match self.backend.get_state().await {
            Ok(state) => self.apply(&state),
            Err(e) => warn!("Failed to refresh timer state after {}: {:#}", action, e),
        }
        self.refresh_badge().await;
    }

    fn apply(&mut self, state: &TimerState) {
        let now_ms = self.clock.now_ms();
        self.phase = state.phase();
        self.deadline_ms = state.end_time.filter(|_| state.is_running);
        self.remaining_seconds = match self.phase {
            Phase::Idle => self.inputs_total(),
            _ => state.remaining_at(now_ms),
        };
        if self.phase != Phase::Finished {
            self.alarm.cancel();
        }
    }

    fn enter_finished(&mut self) {
        info!("Countdown reached zero");
        self.phase = Phase::Finished;
        self.remaining_seconds = 0;
        self.deadline_ms = None;
        self.alarm = AlarmLoop::start(Arc::clone(&self.player), MAX_REPETITIONS, REPEAT_PERIOD);
    }

    fn parsed_inputs(&self) -> (u64, u64) {
        let parse = |value: &str| value.trim().parse::<u64>().unwrap_or(0);
        (parse(&self.minutes_input), parse(&self.seconds_input))
    }

    fn inputs_total(&self) -> u64 {
        let (minutes, seconds) = self.parsed_inputs();
        total_seconds(minutes, seconds)
    }
}
