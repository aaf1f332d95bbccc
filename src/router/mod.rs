//! Router web admin integration
//!
//! - `client`: login and reboot/reset against the admin panel
//! - `scrape`: `pi` / `cgi` token extraction
//! - `session`: firmware-compatible `urn` cookie
//! - `transport`: HTTP layer behind a trait

pub mod client;
pub mod scrape;
pub mod session;
pub mod transport;

use std::sync::Arc;

use async_trait::async_trait;

pub use client::RouterAdminClient;
pub use transport::{HttpTransport, RouterTransport};

use crate::error::AppError;

/// Privileged router operations used by the escalation ladder
#[async_trait]
pub trait RouterAdmin: Send + Sync {
    async fn login(&self, password: &str) -> Result<(), AppError>;

    async fn reboot(&self) -> Result<(), AppError>;

    /// Factory reset
    async fn reset(&self) -> Result<(), AppError>;
}

/// Hands out a fresh admin session (new `urn`) per escalation stage
pub trait RouterSessionFactory: Send + Sync {
    fn open(&self) -> Box<dyn RouterAdmin>;
}

/// Production factory: every session shares one HTTP transport
pub struct HttpRouterFactory {
    transport: Arc<dyn RouterTransport>,
    username: String,
}

impl HttpRouterFactory {
    pub fn new(transport: Arc<dyn RouterTransport>, username: impl Into<String>) -> Self {
        Self {
            transport,
            username: username.into(),
        }
    }
}

impl RouterSessionFactory for HttpRouterFactory {
    fn open(&self) -> Box<dyn RouterAdmin> {
        let client = RouterAdminClient::new(self.transport.clone(), self.username.clone());
        tracing::debug!("Opened router admin session urn={}", client.session().as_str());
        Box::new(client)
    }
}
