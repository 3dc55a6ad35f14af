//! HTTP client used by a timer window to reach a running controller

use std::future::Future;
use anyhow::Context;

use crate::{
    services::BadgeState,
    state::{Command, Reply},
    view::TimerBackend,
};
use super::responses::StatusResponse;

/// Forwards commands to `POST {base_url}/command`
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl TimerBackend for RemoteBackend {
    fn execute(&self, command: Command) -> impl Future<Output = anyhow::Result<Reply>> + Send {
        let url = format!("{}/command", self.base_url);
        let request = self.client.post(url.clone()).json(&command);

        async move {
            let response = request
                .send()
                .await
                .with_context(|| format!("Failed to reach {}", url))?
                .error_for_status()
                .with_context(|| format!("{} rejected {}", url, command.action()))?;
            response
                .json::<Reply>()
                .await
                .with_context(|| format!("Invalid reply to {}", command.action()))
        }
    }

    /// Read from `GET {base_url}/status`
    fn badge(&self) -> impl Future<Output = anyhow::Result<Option<BadgeState>>> + Send {
        let url = format!("{}/status", self.base_url);
        let request = self.client.get(url.clone());

        async move {
            let status = request
                .send()
                .await
                .with_context(|| format!("Failed to reach {}", url))?
                .error_for_status()
                .with_context(|| format!("{} failed", url))?
                .json::<StatusResponse>()
                .await
                .with_context(|| format!("Invalid status from {}", url))?;
            Ok(status.badge)
        }
    }
}
