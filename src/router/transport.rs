//! HTTP transport for the router admin panel

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::redirect::Policy;
use reqwest::Client;

use crate::error::AppError;

/// Plain-text requests against the admin panel, with the session cookie attached
#[async_trait]
pub trait RouterTransport: Send + Sync {
    /// GET a path and return the body as text
    async fn get_text(&self, path: &str, cookie: &str) -> Result<String, AppError>;

    /// POST a form-encoded body. The response body is not needed by any caller.
    async fn post_form(
        &self,
        path: &str,
        cookie: &str,
        content_type: &str,
        body: String,
    ) -> Result<(), AppError>;
}

pub struct HttpTransport {
    base_url: url::Url,
    client: Client,
}

impl HttpTransport {
    pub fn new(base_url: url::Url, timeout: Duration) -> Result<Self, AppError> {
        // login.cgi answers with a redirect we must not follow
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .redirect(Policy::none())
            .build()?;

        Ok(Self { base_url, client })
    }

    fn url(&self, path: &str) -> Result<url::Url, AppError> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::ConfigError(format!("Bad router path {}: {}", path, e)))
    }
}

#[async_trait]
impl RouterTransport for HttpTransport {
    async fn get_text(&self, path: &str, cookie: &str) -> Result<String, AppError> {
        let response = self
            .client
            .get(self.url(path)?)
            .header(COOKIE, cookie)
            .send()
            .await?;

        tracing::debug!("GET {} -> {}", path, response.status());
        Ok(response.text().await?)
    }

    async fn post_form(
        &self,
        path: &str,
        cookie: &str,
        content_type: &str,
        body: String,
    ) -> Result<(), AppError> {
        let response = self
            .client
            .post(self.url(path)?)
            .header(COOKIE, cookie)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;

        tracing::debug!("POST {} -> {}", path, response.status());
        Ok(())
    }
}
