//! HTTP API module
//!
//! This module contains the HTTP endpoints, their response structures and the
//! client the view uses to reach a running controller.

pub mod client;
pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

pub use client::RemoteBackend;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/command", post(command_handler))
        .route("/state", get(state_handler))
        .route("/status", get(status_handler))
        .route("/window", post(window_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
