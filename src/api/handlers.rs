//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{debug, error, info};

use crate::{
    state::{AppState, Command, Reply, TimerState},
    view::format_time,
};
use super::responses::{HealthResponse, StatusResponse, WindowResponse};

/// Handle POST /command - Run one command from the message surface.
///
/// Bodies that are not a known command are answered with `{"success": false}`
/// and change nothing.
pub async fn command_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Reply>, StatusCode> {
    let command = match serde_json::from_slice::<Command>(&body) {
        Ok(command) => command,
        Err(e) => {
            debug!("Ignoring unrecognised command: {}", e);
            return Ok(Json(Reply::rejected()));
        }
    };

    if command.is_mutating() {
        info!("Command received: {}", command.action());
    }
    match state.execute(command) {
        Ok(reply) => Ok(Json(reply)),
        Err(e) => {
            error!("Failed to execute command: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /state - Current timer state with live remaining time
pub async fn state_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerState>, StatusCode> {
    state.get_timer_state().map(Json).map_err(|e| {
        error!("Failed to get timer state: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Handle GET /status - Timer state plus badge, notification and server details
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer_state = match state.get_timer_state() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to get timer state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let window_id = state.windows
        .as_ref()
        .and_then(|windows| windows.lock().ok())
        .and_then(|manager| manager.tracked());
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        phase: timer_state.phase(),
        display: format_time(timer_state.remaining_seconds),
        state: timer_state,
        badge: state.badge(),
        notification_visible: state.notification_visible(),
        window_id,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle POST /window - Focus the timer window, opening it if needed
pub async fn window_handler(State(state): State<Arc<AppState>>) -> Result<Json<WindowResponse>, StatusCode> {
    match state.activate_window() {
        Ok(activation) => Ok(Json(WindowResponse::new(activation))),
        Err(e) => {
            error!("Failed to activate timer window: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
