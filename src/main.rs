//! Popup Timer - A state-managed countdown timer
//!
//! This is the main entry point for the popup-timer application.

use std::{path::Path, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use popup_timer::{
    api::{create_router, RemoteBackend},
    config::{Config, Mode, ServeArgs, WindowArgs},
    services::{
        default_player, BadgeIndicator, ChildProcessHost, Clock, DesktopNotifier, SystemClock,
        WindowManager,
    },
    state::{AppState, Capabilities, Controller, JsonFileStore},
    tasks::{wake_up_dispatch_task, window_watch_task, TokioScheduler},
    utils::shutdown_signal,
    view::{run_window, TimerView},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr so a timer window keeps stdout for its display
    tracing_subscriber::fmt()
        .with_env_filter(format!("popup_timer={},tower_http=info", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    match config.mode {
        Mode::Serve(args) => serve(args).await,
        Mode::Window(args) => window(args).await,
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    info!("Starting popup-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, state={}",
          args.host, args.port, args.state_file.display());

    let host = ChildProcessHost::new(
        args.window_launcher.clone(),
        std::env::current_exe()?,
        args.client_url(),
        args.screen(),
    );
    let windows = WindowManager::new(Box::new(host));
    let state = start_controller(&args.state_file, Some(windows), args.port, args.host.clone());

    let watch_state = Arc::clone(&state);
    tokio::spawn(async move {
        window_watch_task(watch_state).await;
    });

    let app = create_router(state);

    let addr = args.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /command - Run a timer command ({{\"action\": ...}})");
    info!("  GET  /state   - Current timer state");
    info!("  GET  /status  - Timer, badge and notification status");
    info!("  POST /window  - Open or focus the timer window");
    info!("  GET  /health  - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn window(args: WindowArgs) -> anyhow::Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let player = default_player();

    match args.server {
        Some(url) => {
            let backend = RemoteBackend::new(url);
            info!("Timer window connected to {}", backend.base_url());
            run_window(TimerView::new(backend, player, clock), args.geometry).await
        }
        None => {
            info!("Timer window running its own controller on {}", args.state_file.display());
            let state = start_controller(&args.state_file, None, 0, "local".to_string());
            run_window(TimerView::new(state, player, clock), args.geometry).await
        }
    }
}

/// Build the controller with its host capabilities and start delivering wake-ups to it
fn start_controller(
    state_file: &Path,
    windows: Option<WindowManager>,
    port: u16,
    host: String,
) -> Arc<AppState> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let badge = Arc::new(BadgeIndicator::new());
    let notifier = Arc::new(DesktopNotifier::new("popup-timer"));
    let (scheduler, wake_ups) = TokioScheduler::new(Arc::clone(&clock));

    let mut controller = Controller::new(Capabilities {
        store: Box::new(JsonFileStore::new(state_file)),
        scheduler: Box::new(scheduler),
        notifier: notifier.clone(),
        badge: badge.clone(),
        clock,
    });
    let initial = controller.init();
    info!("Timer state loaded: {} with {}s", initial.phase().as_str(), initial.remaining_seconds);

    let state = Arc::new(AppState::new(controller, windows, badge, notifier, port, host));

    let dispatch_state = Arc::clone(&state);
    tokio::spawn(async move {
        wake_up_dispatch_task(dispatch_state, wake_ups).await;
    });

    state
}
