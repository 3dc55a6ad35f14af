//! Host capability module
//!
//! Clock, badge, notification, audio and window surfaces the timer drives.

pub mod alarm;
pub mod badge;
pub mod clock;
pub mod notifier;
pub mod window;

// Re-export main types
pub use alarm::{
    default_player, AlarmLoop, AlarmPlayer, BellPlayer, TonePlayer, MAX_REPETITIONS, REPEAT_PERIOD,
};
pub use badge::{Badge, BadgeIndicator, BadgeState, ALERT_COLOR, ALERT_TEXT};
pub use clock::{Clock, SystemClock};
#[cfg(test)]
pub use clock::ManualClock;
pub use notifier::{DesktopNotifier, Notification, Notifier, COMPLETION_ID};
pub use window::{Activation, ChildProcessHost, WindowBounds, WindowManager};
