//! Background tasks module
//!
//! This module contains the scheduler and the tasks that run alongside the
//! HTTP server.

pub mod scheduler;
pub mod task_handle;
pub mod wake_up_dispatch;
pub mod window_watch;

// Re-export main types and functions
pub use scheduler::{Scheduler, TokioScheduler, WakeUp, WakeUpKind, TICK_PERIOD};
pub use task_handle::TaskHandle;
pub use wake_up_dispatch::wake_up_dispatch_task;
pub use window_watch::window_watch_task;
