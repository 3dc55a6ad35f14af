//! Main application state shared by the HTTP handlers and background tasks

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};

use crate::{
    services::{
        Activation, BadgeIndicator, BadgeState, Notifier, WindowManager, COMPLETION_ID,
    },
    tasks::WakeUp,
};
use super::{Command, Controller, Reply, TimerState};

/// Everything a running timer process owns
pub struct AppState {
    /// The single writer of the timer record
    pub controller: Mutex<Controller>,
    /// Floating window tracking, absent when this process is itself the window
    pub windows: Option<Mutex<WindowManager>>,
    pub badge: Arc<BadgeIndicator>,
    pub notifier: Arc<dyn Notifier>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    pub fn new(
        controller: Controller,
        windows: Option<WindowManager>,
        badge: Arc<BadgeIndicator>,
        notifier: Arc<dyn Notifier>,
        port: u16,
        host: String,
    ) -> Self {
        Self {
            controller: Mutex::new(controller),
            windows: windows.map(Mutex::new),
            badge,
            notifier,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        }
    }

    /// Run a command against the controller, recording mutating ones
    pub fn execute(&self, command: Command) -> Result<Reply, String> {
        let mut controller = self.controller.lock()
            .map_err(|e| format!("Failed to lock controller: {}", e))?;

        let action = command.action();
        let mutating = command.is_mutating();
        let reply = controller.execute(command);
        drop(controller);

        if mutating {
            self.record_action(action);
        }
        Ok(reply)
    }

    /// Forward a fired wake-up to the controller
    pub fn handle_wake_up(&self, wake_up: WakeUp) -> Result<TimerState, String> {
        let mut controller = self.controller.lock()
            .map_err(|e| format!("Failed to lock controller: {}", e))?;
        Ok(controller.on_scheduled_fire(wake_up))
    }

    pub fn get_timer_state(&self) -> Result<TimerState, String> {
        self.controller.lock()
            .map(|controller| controller.get_state())
            .map_err(|e| format!("Failed to lock controller: {}", e))
    }

    pub fn activate_window(&self) -> Result<Activation, String> {
        let mut windows = self.windows
            .as_ref()
            .ok_or_else(|| "Window management is not available".to_string())?
            .lock()
            .map_err(|e| format!("Failed to lock window manager: {}", e))?;
        let activation = windows.activate()?;
        drop(windows);

        self.record_action("window");
        Ok(activation)
    }

    pub fn badge(&self) -> Option<BadgeState> {
        self.badge.current()
    }

    pub fn notification_visible(&self) -> bool {
        self.notifier.is_showing(COMPLETION_ID)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }
}
