//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::{Args, Parser, Subcommand};

use crate::services::WindowBounds;

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "popup-timer")]
#[command(about = "A countdown timer daemon with a floating terminal window")]
#[command(version)]
pub struct Config {
    #[command(subcommand)]
    pub mode: Mode,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Mode {
    /// Run the timer controller and its HTTP command surface
    Serve(ServeArgs),
    /// Open a timer window in this terminal
    Window(WindowArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// File holding the persisted timer state
    #[arg(long, default_value = "timer-state.json")]
    pub state_file: PathBuf,

    /// Terminal emulator used to open timer windows
    #[arg(long, default_value = "x-terminal-emulator")]
    pub window_launcher: String,

    /// Width of the screen timer windows are centred on
    #[arg(long, default_value = "1920")]
    pub screen_width: u32,

    /// Height of the screen timer windows are centred on
    #[arg(long, default_value = "1080")]
    pub screen_height: u32,
}

#[derive(Debug, Clone, Args)]
pub struct WindowArgs {
    /// URL of a running `popup-timer serve`; without it the window runs its own timer
    #[arg(long)]
    pub server: Option<String>,

    /// File holding the persisted timer state when running without a server
    #[arg(long, default_value = "timer-state.json")]
    pub state_file: PathBuf,

    /// Move and resize this terminal to WIDTHxHEIGHT+LEFT+TOP pixels
    #[arg(long)]
    pub geometry: Option<WindowBounds>,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

impl ServeArgs {
    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// URL a local timer window uses to reach this server
    pub fn client_url(&self) -> String {
        let host = match self.host.as_str() {
            "0.0.0.0" | "::" => "127.0.0.1",
            host => host,
        };
        format!("http://{}:{}", host, self.port)
    }

    pub fn screen(&self) -> WindowBounds {
        WindowBounds {
            left: 0,
            top: 0,
            width: self.screen_width,
            height: self.screen_height,
        }
    }
}
