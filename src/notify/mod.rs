//! Notification module

mod discord;

pub use discord::DiscordNotifier;

use async_trait::async_trait;

/// Connectivity check by delivering an outbound request
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// True if the request completed, whatever the HTTP status
    async fn probe(&self) -> bool;
}
