//! Popup Timer - A state-managed countdown timer
//!
//! The controller owns the single persisted countdown, turns commands into
//! scheduled wake-ups and raises a notification and badge when time runs out.
//! Timer windows render the countdown, forward button presses and play the
//! alarm.

pub mod api;
pub mod config;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;
pub mod view;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use state::{AppState, Controller, TimerState};
pub use utils::signals::shutdown_signal;
