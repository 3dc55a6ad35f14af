//! Desktop notification surface

use std::{
    collections::{HashMap, HashSet},
    sync::{mpsc, Arc, Mutex},
    thread,
};
use notify_rust::{Timeout, Urgency};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Stable id of the completion notification so it can be cleared later
pub const COMPLETION_ID: &str = "timer-finished";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Normal,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub require_interaction: bool,
}

impl Notification {
    /// The fixed notification raised when the countdown reaches zero
    pub fn timer_finished() -> Self {
        Self {
            id: COMPLETION_ID.to_string(),
            title: "⏰ タイマー終了！".to_string(),
            message: "タイマーが終了しました".to_string(),
            priority: Priority::High,
            require_interaction: true,
        }
    }
}

/// Surface able to show notifications and clear them by id
pub trait Notifier: Send + Sync {
    fn show(&self, notification: &Notification) -> Result<(), String>;
    fn clear(&self, id: &str) -> Result<(), String>;
    fn is_showing(&self, id: &str) -> bool;
}

enum Request {
    Show(Notification),
    Clear(String),
}

/// Freedesktop notifications, driven from a dedicated thread that owns the
/// notification handles
pub struct DesktopNotifier {
    tx: Mutex<mpsc::Sender<Request>>,
    visible: Arc<Mutex<HashSet<String>>>,
}

impl DesktopNotifier {
    pub fn new(app_name: &str) -> Self {
        let (tx, rx) = mpsc::channel();
        let visible = Arc::new(Mutex::new(HashSet::new()));
        let app_name = app_name.to_string();
        let thread_visible = Arc::clone(&visible);

        thread::Builder::new()
            .name("notifier".to_string())
            .spawn(move || notification_thread(app_name, rx, thread_visible))
            .map_err(|e| warn!("Failed to spawn notifier thread: {}", e))
            .ok();

        Self { tx: Mutex::new(tx), visible }
    }

    fn send(&self, request: Request) -> Result<(), String> {
        self.tx
            .lock()
            .map_err(|e| format!("Failed to lock notifier channel: {}", e))?
            .send(request)
            .map_err(|_| "Notifier thread is not running".to_string())
    }
}

impl Notifier for DesktopNotifier {
    fn show(&self, notification: &Notification) -> Result<(), String> {
        if let Ok(mut visible) = self.visible.lock() {
            visible.insert(notification.id.clone());
        }
        self.send(Request::Show(notification.clone()))
    }

    fn clear(&self, id: &str) -> Result<(), String> {
        let was_visible = self.visible
            .lock()
            .map(|mut visible| visible.remove(id))
            .unwrap_or(false);
        if was_visible {
            self.send(Request::Clear(id.to_string()))?;
        }
        Ok(())
    }

    fn is_showing(&self, id: &str) -> bool {
        self.visible.lock().map(|v| v.contains(id)).unwrap_or(false)
    }
}

fn notification_thread(
    app_name: String,
    rx: mpsc::Receiver<Request>,
    visible: Arc<Mutex<HashSet<String>>>,
) {
    let mut handles: HashMap<String, notify_rust::NotificationHandle> = HashMap::new();

    while let Ok(request) = rx.recv() {
        match request {
            Request::Show(notification) => {
                if let Some(previous) = handles.remove(&notification.id) {
                    previous.close();
                }

                let mut desktop = notify_rust::Notification::new();
                desktop
                    .appname(&app_name)
                    .summary(&notification.title)
                    .body(&notification.message);
                if notification.require_interaction {
                    desktop.timeout(Timeout::Never);
                }
                if notification.priority == Priority::High {
                    desktop.urgency(Urgency::Critical);
                }

                match desktop.show() {
                    Ok(handle) => {
                        info!("Notification {} shown", notification.id);
                        handles.insert(notification.id, handle);
                    }
                    Err(e) => {
                        warn!("Failed to show notification {}: {}", notification.id, e);
                        if let Ok(mut visible) = visible.lock() {
                            visible.remove(&notification.id);
                        }
                    }
                }
            }
            Request::Clear(id) => {
                if let Some(handle) = handles.remove(&id) {
                    handle.close();
                    debug!("Notification {} closed", id);
                }
            }
        }
    }
}
