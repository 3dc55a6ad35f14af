//! Timer state record and its transitions

use serde::{Deserialize, Serialize};

/// Duration used when nothing (or zero) has been configured
pub const DEFAULT_SECONDS: u64 = 5;
/// Longest countdown accepted, 99:59:59; longer requests are clamped to it
pub const MAX_SECONDS: u64 = 99 * 3600 + 59 * 60 + 59;

/// The four mutually exclusive phases a countdown can be in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Idle,
    Running,
    Paused,
    Finished,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Paused => "paused",
            Phase::Finished => "finished",
        }
    }
}

/// The single persisted countdown record.
///
/// `end_time` is an absolute wall-clock timestamp in epoch milliseconds and is
/// only present while the countdown is running. Every reader that needs the
/// live remaining time recomputes it from `end_time` instead of trusting
/// `remaining_seconds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerState {
    pub remaining_seconds: u64,
    pub is_running: bool,
    pub is_paused: bool,
    pub is_finished: bool,
    pub input_minutes: u64,
    /// `None` means the seconds field was never set
    pub input_seconds: Option<u64>,
    pub end_time: Option<i64>,
}

impl TimerState {
    /// Create the first-run state: five seconds, idle
    pub fn new() -> Self {
        Self {
            remaining_seconds: DEFAULT_SECONDS,
            is_running: false,
            is_paused: false,
            is_finished: false,
            input_minutes: 0,
            input_seconds: Some(DEFAULT_SECONDS),
            end_time: None,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.is_finished {
            Phase::Finished
        } else if self.is_running {
            Phase::Running
        } else if self.is_paused {
            Phase::Paused
        } else {
            Phase::Idle
        }
    }

    /// Duration the user configured, in seconds
    pub fn configured_seconds(&self) -> u64 {
        total_seconds(self.input_minutes, self.input_seconds.unwrap_or(DEFAULT_SECONDS))
    }

    /// Remaining seconds as of `now_ms`, recomputed from the deadline when running
    pub fn remaining_at(&self, now_ms: i64) -> u64 {
        match (self.is_running, self.end_time) {
            (true, Some(end_time)) => remaining_until(end_time, now_ms),
            _ => self.remaining_seconds,
        }
    }

    /// Copy of this state with `remaining_seconds` brought up to date
    pub fn live(&self, now_ms: i64) -> Self {
        let mut state = self.clone();
        state.remaining_seconds = self.remaining_at(now_ms);
        state
    }

    /// Enter the running phase with a deadline `total_seconds` from now
    pub fn run_for(&mut self, total_seconds: u64, now_ms: i64) -> i64 {
        let total_seconds = total_seconds.min(MAX_SECONDS);
        let end_time = now_ms.saturating_add(total_seconds as i64 * 1000);
        self.remaining_seconds = total_seconds;
        self.is_running = true;
        self.is_paused = false;
        self.is_finished = false;
        self.end_time = Some(end_time);
        end_time
    }

    /// Freeze the countdown at its current remaining time
    pub fn pause_at(&mut self, now_ms: i64) {
        self.remaining_seconds = self.remaining_at(now_ms);
        self.is_running = false;
        self.is_paused = true;
        self.end_time = None;
    }

    pub fn finish(&mut self) {
        self.remaining_seconds = 0;
        self.is_running = false;
        self.is_paused = false;
        self.is_finished = true;
        self.end_time = None;
    }

    /// Return to idle with the configured duration loaded
    pub fn reset(&mut self) {
        self.remaining_seconds = self.configured_seconds();
        self.is_running = false;
        self.is_paused = false;
        self.is_finished = false;
        self.end_time = None;
    }

    /// Check the flag invariants: one phase at a time, deadline iff running
    pub fn is_consistent(&self) -> bool {
        let flags = [self.is_running, self.is_paused, self.is_finished];
        flags.iter().filter(|f| **f).count() <= 1
            && self.end_time.is_some() == self.is_running
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Zero-length countdowns are clamped to the default duration, overlong ones
/// to `MAX_SECONDS`
pub fn effective_duration(total_seconds: u64) -> u64 {
    match total_seconds {
        0 => DEFAULT_SECONDS,
        total => total.min(MAX_SECONDS),
    }
}

/// Minutes and seconds fields combined, saturating at `MAX_SECONDS`
pub fn total_seconds(minutes: u64, seconds: u64) -> u64 {
    minutes
        .saturating_mul(60)
        .saturating_add(seconds)
        .min(MAX_SECONDS)
}

/// Whole seconds left until `end_ms`, rounded up and clamped at zero
pub fn remaining_until(end_ms: i64, now_ms: i64) -> u64 {
    let diff = end_ms.saturating_sub(now_ms);
    if diff <= 0 {
        0
    } else {
        ((diff - 1) / 1000 + 1) as u64
    }
}
