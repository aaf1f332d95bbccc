//! Discord webhook notifications, doubling as the connectivity probe

use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use serde::Serialize;

use super::ConnectivityProbe;
use crate::config::NotifyConfig;

/// Discord notifier
pub struct DiscordNotifier {
    client: reqwest::Client,
    webhook_url: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct DiscordWebhookPayload {
    content: String,
}

impl DiscordWebhookPayload {
    fn online(now: chrono::DateTime<Local>) -> Self {
        Self {
            content: format!(
                "I'm online! The time is {}.",
                now.format("%Y-%m-%d %H:%M:%S")
            ),
        }
    }
}

impl DiscordNotifier {
    pub fn new(config: &NotifyConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url: config.webhook_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

#[async_trait]
impl ConnectivityProbe for DiscordNotifier {
    /// Any HTTP answer means we reached the internet; only transport errors count as offline.
    async fn probe(&self) -> bool {
        let payload = DiscordWebhookPayload::online(Local::now());

        match self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => {
                if !response.status().is_success() {
                    tracing::warn!("Discord webhook returned status: {}", response.status());
                }
                tracing::info!("> We're online!");
                true
            }
            Err(e) => {
                tracing::info!("> Connection failed, {}", e);
                false
            }
        }
    }
}
