//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    services::{Activation, BadgeState},
    state::{Phase, TimerState},
};

/// Status response with badge, notification and server information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub state: TimerState,
    pub phase: Phase,
    /// Remaining time as the view renders it
    pub display: String,
    pub badge: Option<BadgeState>,
    pub notification_visible: bool,
    pub window_id: Option<u32>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Result of a window activation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowResponse {
    #[serde(flatten)]
    pub activation: Activation,
    pub timestamp: DateTime<Utc>,
}

impl WindowResponse {
    pub fn new(activation: Activation) -> Self {
        Self {
            activation,
            timestamp: Utc::now(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
