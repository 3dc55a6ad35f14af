//! Timer window module
//!
//! Presentation, local countdown and alarm for one open timer window, plus
//! its terminal front end.

pub mod backend;
pub mod format;
pub mod presentation;
pub mod terminal;
pub mod timer_view;

// Re-export main types and functions
pub use backend::{TimerBackend, TimerBackendExt};
pub use format::format_time;
pub use presentation::Controls;
pub use terminal::run_window;
pub use timer_view::TimerView;
