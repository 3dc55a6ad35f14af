//! Floating timer window lifecycle: at most one window, focused instead of duplicated

use std::{
    collections::HashMap,
    path::PathBuf,
    process::{Child, Command, Stdio},
    str::FromStr,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub type WindowId = u32;

pub const POPUP_WIDTH: u32 = 320;
pub const POPUP_HEIGHT: u32 = 260;
/// Distance of the popup from the top of the invoking window
pub const POPUP_TOP_OFFSET: i32 = 50;
pub const WINDOW_TITLE: &str = "popup-timer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl WindowBounds {
    /// Fixed-size popup centred horizontally inside `self`, near its top edge
    pub fn popup_near_top(&self) -> WindowBounds {
        let spare = self.width as f64 - POPUP_WIDTH as f64;
        WindowBounds {
            left: self.left + (spare / 2.0 + 0.5).floor() as i32,
            top: self.top + POPUP_TOP_OFFSET,
            width: POPUP_WIDTH,
            height: POPUP_HEIGHT,
        }
    }

    /// `WIDTHxHEIGHT+LEFT+TOP`, in pixels
    pub fn geometry(&self) -> String {
        format!("{}x{}+{}+{}", self.width, self.height, self.left, self.top)
    }

    /// xterm window operations that move the terminal to these bounds and
    /// resize it to this many pixels
    pub fn placement_sequence(&self) -> String {
        format!(
            "\x1b[3;{};{}t\x1b[4;{};{}t",
            self.left, self.top, self.height, self.width
        )
    }
}

impl FromStr for WindowBounds {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("Invalid geometry {:?}, expected WIDTHxHEIGHT+LEFT+TOP", value);
        let (size, position) = value.split_once('+').ok_or_else(invalid)?;
        let (width, height) = size.split_once('x').ok_or_else(invalid)?;
        let (left, top) = position.split_once('+').ok_or_else(invalid)?;
        Ok(WindowBounds {
            left: left.parse().map_err(|_| invalid())?,
            top: top.parse().map_err(|_| invalid())?,
            width: width.parse().map_err(|_| invalid())?,
            height: height.parse().map_err(|_| invalid())?,
        })
    }
}

/// Host window system
pub trait WindowHost: Send {
    /// Whether `id` still refers to a live window; an unknown id is an error
    fn is_open(&mut self, id: WindowId) -> Result<bool, String>;
    fn focus(&mut self, id: WindowId) -> Result<(), String>;
    /// Bounds of the window the activation was invoked from
    fn current_bounds(&self) -> WindowBounds;
    fn create_popup(&mut self, bounds: WindowBounds) -> Result<WindowId, String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum Activation {
    Focused { id: WindowId },
    Created { id: WindowId },
}

/// Tracks the single timer window
pub struct WindowManager {
    host: Box<dyn WindowHost>,
    tracked: Option<WindowId>,
}

impl WindowManager {
    pub fn new(host: Box<dyn WindowHost>) -> Self {
        Self { host, tracked: None }
    }

    pub fn tracked(&self) -> Option<WindowId> {
        self.tracked
    }

    /// Focus the tracked window if it is still alive, otherwise open a new one
    pub fn activate(&mut self) -> Result<Activation, String> {
        if let Some(id) = self.tracked {
            match self.host.is_open(id) {
                Ok(true) => {
                    if let Err(e) = self.host.focus(id) {
                        warn!("Failed to focus timer window {}: {}", id, e);
                    }
                    debug!("Timer window {} focused", id);
                    return Ok(Activation::Focused { id });
                }
                Ok(false) => debug!("Timer window {} is gone", id),
                Err(e) => debug!("Stale timer window {}: {}", id, e),
            }
            self.tracked = None;
        }

        let bounds = self.host.current_bounds().popup_near_top();
        let id = self.host.create_popup(bounds)?;
        info!("Timer window {} created at {}", id, bounds.geometry());
        self.tracked = Some(id);
        Ok(Activation::Created { id })
    }

    /// Host reported that `id` was closed
    pub fn on_window_removed(&mut self, id: WindowId) {
        if self.tracked == Some(id) {
            info!("Timer window {} closed", id);
            self.tracked = None;
        }
    }

    /// Forget the tracked window if it has closed since the last check
    pub fn reap_closed(&mut self) -> Option<WindowId> {
        let id = self.tracked?;
        match self.host.is_open(id) {
            Ok(true) => None,
            _ => {
                self.on_window_removed(id);
                Some(id)
            }
        }
    }
}

/// Opens each timer window as a terminal running `popup-timer window`
pub struct ChildProcessHost {
    launcher: String,
    program: PathBuf,
    server_url: String,
    screen: WindowBounds,
    children: HashMap<WindowId, Child>,
    next_id: WindowId,
}

impl ChildProcessHost {
    pub fn new(launcher: String, program: PathBuf, server_url: String, screen: WindowBounds) -> Self {
        Self {
            launcher,
            program,
            server_url,
            screen,
            children: HashMap::new(),
            next_id: 1,
        }
    }

    /// Terminal invocation for one window. The window places itself from
    /// `--geometry` since launchers disagree on how to size a new terminal.
    fn launch_command(&self, bounds: WindowBounds) -> Command {
        let mut command = Command::new(&self.launcher);
        command
            .args(["-T", WINDOW_TITLE, "-e"])
            .arg(&self.program)
            .args(["window", "--server", &self.server_url])
            .args(["--geometry", &bounds.geometry()]);
        command
    }
}

impl WindowHost for ChildProcessHost {
    fn is_open(&mut self, id: WindowId) -> Result<bool, String> {
        let child = self.children
            .get_mut(&id)
            .ok_or_else(|| format!("No window with id {}", id))?;
        match child.try_wait() {
            Ok(None) => Ok(true),
            Ok(Some(status)) => {
                debug!("Timer window {} exited with {}", id, status);
                self.children.remove(&id);
                Ok(false)
            }
            Err(e) => Err(format!("Failed to poll window {}: {}", id, e)),
        }
    }

    fn focus(&mut self, _id: WindowId) -> Result<(), String> {
        let status = Command::new("wmctrl")
            .args(["-a", WINDOW_TITLE])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| format!("Failed to execute wmctrl: {}", e))?;
        if status.success() {
            Ok(())
        } else {
            Err(format!("wmctrl exited with {}", status))
        }
    }

    fn current_bounds(&self) -> WindowBounds {
        self.screen
    }

    fn create_popup(&mut self, bounds: WindowBounds) -> Result<WindowId, String> {
        let child = self.launch_command(bounds)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| format!("Failed to launch {}: {}", self.launcher, e))?;

        let id = self.next_id;
        self.next_id += 1;
        self.children.insert(id, child);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct Recorded {
        open: Vec<WindowId>,
        created: Vec<WindowBounds>,
        focused: Vec<WindowId>,
    }

    /// In-memory window system; closing a window just drops it from `open`
    #[derive(Clone, Default)]
    struct FakeHost {
        inner: Arc<Mutex<Recorded>>,
    }

    impl FakeHost {
        fn close(&self, id: WindowId) {
            self.inner.lock().unwrap().open.retain(|w| *w != id);
        }
    }

    impl WindowHost for FakeHost {
        fn is_open(&mut self, id: WindowId) -> Result<bool, String> {
            let inner = self.inner.lock().unwrap();
            if inner.open.contains(&id) {
                Ok(true)
            } else {
                Err(format!("No window with id {}", id))
            }
        }

        fn focus(&mut self, id: WindowId) -> Result<(), String> {
            self.inner.lock().unwrap().focused.push(id);
            Ok(())
        }

        fn current_bounds(&self) -> WindowBounds {
            WindowBounds { left: 100, top: 40, width: 1200, height: 800 }
        }

        fn create_popup(&mut self, bounds: WindowBounds) -> Result<WindowId, String> {
            let mut inner = self.inner.lock().unwrap();
            inner.created.push(bounds);
            let id = inner.created.len() as WindowId;
            inner.open.push(id);
            Ok(id)
        }
    }

    #[test]
    fn second_activation_focuses_existing_window() {
        let host = FakeHost::default();
        let mut manager = WindowManager::new(Box::new(host.clone()));

        assert_eq!(manager.activate().unwrap(), Activation::Created { id: 1 });
        assert_eq!(manager.activate().unwrap(), Activation::Focused { id: 1 });

        let inner = host.inner.lock().unwrap();
        assert_eq!(inner.created.len(), 1);
        assert_eq!(inner.focused, vec![1]);
    }

    #[test]
    fn popup_is_centred_near_the_top() {
        let host = FakeHost::default();
        let mut manager = WindowManager::new(Box::new(host.clone()));
        manager.activate().unwrap();

        let created = host.inner.lock().unwrap().created[0];
        assert_eq!(created, WindowBounds { left: 540, top: 90, width: 320, height: 260 });
    }

    #[test]
    fn closed_window_is_replaced() {
        let host = FakeHost::default();
        let mut manager = WindowManager::new(Box::new(host.clone()));
        manager.activate().unwrap();

        host.close(1);
        assert_eq!(manager.activate().unwrap(), Activation::Created { id: 2 });
        assert_eq!(manager.tracked(), Some(2));
    }

    #[test]
    fn removal_clears_only_the_tracked_window() {
        let host = FakeHost::default();
        let mut manager = WindowManager::new(Box::new(host.clone()));
        manager.activate().unwrap();

        manager.on_window_removed(7);
        assert_eq!(manager.tracked(), Some(1));

        host.close(1);
        assert_eq!(manager.reap_closed(), Some(1));
        assert_eq!(manager.tracked(), None);
        assert_eq!(manager.reap_closed(), None);
    }

    #[test]
    fn launched_window_is_told_its_geometry() {
        let host = ChildProcessHost::new(
            "xterm".to_string(),
            PathBuf::from("/usr/bin/popup-timer"),
            "http://127.0.0.1:20554".to_string(),
            WindowBounds { left: 0, top: 0, width: 1920, height: 1080 },
        );
        let bounds = host.current_bounds().popup_near_top();
        let command = host.launch_command(bounds);

        assert_eq!(command.get_program(), "xterm");
        let args: Vec<_> = command.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            [
                "-T", "popup-timer", "-e", "/usr/bin/popup-timer",
                "window", "--server", "http://127.0.0.1:20554",
                "--geometry", "320x260+800+50",
            ]
        );
    }

    #[test]
    fn geometry_parses_back_into_bounds() {
        let bounds = WindowBounds { left: 800, top: 50, width: 320, height: 260 };
        assert_eq!(bounds.geometry().parse::<WindowBounds>(), Ok(bounds));
        assert_eq!(bounds.placement_sequence(), "\x1b[3;800;50t\x1b[4;260;320t");
        assert!("320x260".parse::<WindowBounds>().is_err());
        assert!("axb+1+2".parse::<WindowBounds>().is_err());
    }

    #[test]
    fn odd_spare_width_rounds_half_up() {
        let outer = WindowBounds { left: 0, top: 0, width: 1001, height: 600 };
        assert_eq!(outer.popup_near_top().left, 341);
    }
}
