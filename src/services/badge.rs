//! Badge overlay shown on the timer's icon

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

/// Glyph shown while the alarm is active
pub const ALERT_TEXT: &str = "!";
/// Warning colour behind the alert glyph
pub const ALERT_COLOR: &str = "#FF453A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeState {
    pub text: String,
    pub color: String,
}

/// Surface that can display or clear a short badge
pub trait Badge: Send + Sync {
    fn set(&self, text: &str, color: &str) -> Result<(), String>;
    fn clear(&self) -> Result<(), String>;
}

/// In-process badge, read back by `/status` and the timer window
#[derive(Debug)]
pub struct BadgeIndicator {
    current: watch::Sender<Option<BadgeState>>,
}

impl BadgeIndicator {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self { current }
    }

    pub fn current(&self) -> Option<BadgeState> {
        self.current.borrow().clone()
    }
}

impl Default for BadgeIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl Badge for BadgeIndicator {
    fn set(&self, text: &str, color: &str) -> Result<(), String> {
        debug!("Badge set to {:?} ({})", text, color);
        self.current.send_replace(Some(BadgeState {
            text: text.to_string(),
            color: color.to_string(),
        }));
        Ok(())
    }

    fn clear(&self) -> Result<(), String> {
        if self.current.send_replace(None).is_some() {
            debug!("Badge cleared");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_clear_are_observed() {
        let badge = BadgeIndicator::new();
        badge.set(ALERT_TEXT, ALERT_COLOR).unwrap();
        assert_eq!(badge.current().map(|b| b.text), Some("!".to_string()));
        badge.clear().unwrap();
        badge.clear().unwrap();
        assert_eq!(badge.current(), None);
    }
}
