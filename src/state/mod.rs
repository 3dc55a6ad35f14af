//! State management module
//!
//! This module contains the timer record, its storage and the controller that
//! owns it.

pub mod app_state;
pub mod command;
pub mod controller;
pub mod store;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use command::{Command, Reply};
pub use controller::{Capabilities, Controller};
pub use store::{JsonFileStore, MemoryStore, StateStore};
pub use timer_state::{Phase, TimerState, DEFAULT_SECONDS, MAX_SECONDS};
