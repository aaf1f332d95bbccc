//! Router web admin client
//!
//! Drives the firmware's login and apply pages the way its own JavaScript does.
//! There is no real auth API: a random `urn` cookie plus an MD5 of the password
//! make a session, and each command needs two tokens scraped from served pages.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use md5::{Digest, Md5};

use super::scrape::{extract_page_token, extract_parameter_token};
use super::session::SessionToken;
use super::transport::RouterTransport;
use super::RouterAdmin;
use crate::error::AppError;

const LOGIN_PATH: &str = "/login.cgi";
const APPLY_PATH: &str = "/apply.cgi";
const LOGIN_CONTENT_TYPE: &str = "text/plain;charset=UTF-8";
const APPLY_CONTENT_TYPE: &str = "text/plain";

/// Privileged commands accepted by `apply.cgi`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    Reboot,
    Restore,
}

impl AdminCommand {
    /// Page carrying the `pi` meta tag
    pub fn status_page(&self) -> &'static str {
        match self {
            AdminCommand::Reboot => "/restart.htm",
            AdminCommand::Restore => "/system.htm",
        }
    }

    /// Script carrying the `cgi` parameter name
    pub fn script(&self) -> &'static str {
        match self {
            AdminCommand::Reboot => "/cgi/cgi_Restart.js",
            AdminCommand::Restore => "/cgi/cgi_system.js",
        }
    }

    /// `GO` target the panel navigates to after applying
    pub fn go_page(&self) -> &'static str {
        match self {
            AdminCommand::Reboot => "basic_-_restart.htm",
            AdminCommand::Restore => "system.htm",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AdminCommand::Reboot => "REBOOT",
            AdminCommand::Restore => "RESTORE",
        }
    }
}

/// Lowercase hex MD5, as the login form expects
pub fn hash_password(password: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// `apply.cgi` body; `%3D` is a pre-encoded `=` inside the SET0 value
fn apply_body(command: AdminCommand, cgi: &str, pi: &str) -> String {
    format!(
        "CMD=&GO={}&SET0={}%3D{}&pi={}",
        command.go_page(),
        cgi,
        command.as_str(),
        pi
    )
}

/// One admin session against the router. Build a fresh one per escalation stage.
pub struct RouterAdminClient {
    transport: Arc<dyn RouterTransport>,
    session: SessionToken,
    username: String,
}

impl RouterAdminClient {
    pub fn new(transport: Arc<dyn RouterTransport>, username: impl Into<String>) -> Self {
        Self {
            transport,
            session: SessionToken::generate(),
            username: username.into(),
        }
    }

    pub fn session(&self) -> &SessionToken {
        &self.session
    }

    /// Scrape both tokens and fire the command. The apply POST is best-effort:
    /// the router often drops the connection as it goes down.
    async fn send_command(&self, command: AdminCommand) -> Result<(), AppError> {
        let cookie = self.session.cookie();

        let page = self
            .transport
            .get_text(command.status_page(), &cookie)
            .await?;
        let pi = extract_page_token(&page).map_err(|token| AppError::Extraction {
            path: command.status_page().to_string(),
            token,
        })?;

        // Cache-busting timestamp, same as the panel's own script loader
        let script_path = format!("{}?t={}", command.script(), Utc::now().timestamp_millis());
        let script = self.transport.get_text(&script_path, &cookie).await?;
        let cgi = extract_parameter_token(&script).map_err(|token| AppError::Extraction {
            path: command.script().to_string(),
            token,
        })?;

        tracing::debug!("Scraped tokens for {}: pi={}, cgi={}", command.as_str(), pi, cgi);

        let result = self
            .transport
            .post_form(
                APPLY_PATH,
                &cookie,
                APPLY_CONTENT_TYPE,
                apply_body(command, &cgi, &pi),
            )
            .await;

        match result {
            Ok(()) => tracing::info!(" > {} command sent!", command.as_str()),
            Err(e) => {
                let e = AppError::CommandSend(e.to_string());
                tracing::warn!(
                    " > {} command sent, no answer (router may already be restarting): {}",
                    command.as_str(),
                    e
                );
            }
        }

        Ok(())
    }
}

#[async_trait]
impl RouterAdmin for RouterAdminClient {
    /// The response is never checked; a wrong password only shows up later
    /// as a missing token on the status page.
    async fn login(&self, password: &str) -> Result<(), AppError> {
        let body = format!(
            "GO=broadband.htm&usr={}&pws={}",
            self.username,
            hash_password(password)
        );

        self.transport
            .post_form(LOGIN_PATH, &self.session.cookie(), LOGIN_CONTENT_TYPE, body)
            .await?;

        tracing::info!(" > We're probably logged in now");
        Ok(())
    }

    async fn reboot(&self) -> Result<(), AppError> {
        self.send_command(AdminCommand::Reboot).await
    }

    async fn reset(&self) -> Result<(), AppError> {
        self.send_command(AdminCommand::Restore).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio_test::{assert_err, assert_ok};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Get { path: String, cookie: String },
        Post { path: String, cookie: String, content_type: String, body: String },
    }

    /// Serves canned bodies keyed by path (query stripped) and records every request
    #[derive(Default)]
    struct FakeTransport {
        pages: HashMap<&'static str, &'static str>,
        fail_posts_to: Option<&'static str>,
        calls: Mutex<Vec<Call>>,
    }

    impl FakeTransport {
        fn with_pages(pages: &[(&'static str, &'static str)]) -> Self {
            Self {
                pages: pages.iter().copied().collect(),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RouterTransport for FakeTransport {
        async fn get_text(&self, path: &str, cookie: &str) -> Result<String, AppError> {
            self.calls.lock().unwrap().push(Call::Get {
                path: path.to_string(),
                cookie: cookie.to_string(),
            });
            let key = path.split('?').next().unwrap_or(path);
            Ok(self.pages.get(key).copied().unwrap_or("").to_string())
        }

        async fn post_form(
            &self,
            path: &str,
            cookie: &str,
            content_type: &str,
            body: String,
        ) -> Result<(), AppError> {
            self.calls.lock().unwrap().push(Call::Post {
                path: path.to_string(),
                cookie: cookie.to_string(),
                content_type: content_type.to_string(),
                body,
            });
            if self.fail_posts_to == Some(path) {
                return Err(AppError::CommandSend("connection reset".to_string()));
            }
            Ok(())
        }
    }

    const RESTART_PAGE: &str = r#"<html><head><meta name="pi" content="XYZ123"></head></html>"#;
    const SYSTEM_PAGE: &str = r#"<html><head><meta name="pi" content="SYS789"></head></html>"#;

    fn client_with(transport: &Arc<FakeTransport>) -> RouterAdminClient {
        RouterAdminClient::new(transport.clone() as Arc<dyn RouterTransport>, "admin")
    }

    #[test]
    fn test_hash_password() {
        assert_eq!(
            hash_password("password123"),
            "482c811da5d5b4bc6d497ffa98491e38"
        );
    }

    #[test]
    fn test_apply_body() {
        assert_eq!(
            apply_body(AdminCommand::Reboot, "TOKEN42", "XYZ123"),
            "CMD=&GO=basic_-_restart.htm&SET0=TOKEN42%3DREBOOT&pi=XYZ123"
        );
        assert_eq!(
            apply_body(AdminCommand::Restore, "sysFlag", "SYS789"),
            "CMD=&GO=system.htm&SET0=sysFlag%3DRESTORE&pi=SYS789"
        );
    }

    #[tokio::test]
    async fn test_login_posts_hashed_password() {
        let transport = Arc::new(FakeTransport::default());
        let client = client_with(&transport);

        assert_ok!(client.login("password123").await);

        assert_eq!(
            transport.calls(),
            vec![Call::Post {
                path: "/login.cgi".to_string(),
                cookie: client.session().cookie(),
                content_type: "text/plain;charset=UTF-8".to_string(),
                body: "GO=broadband.htm&usr=admin&pws=482c811da5d5b4bc6d497ffa98491e38"
                    .to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_reboot_request_sequence() {
        let transport = Arc::new(FakeTransport::with_pages(&[
            ("/restart.htm", RESTART_PAGE),
            ("/cgi/cgi_Restart.js", "foo,TOKEN42,bar"),
        ]));
        let client = client_with(&transport);
        let cookie = client.session().cookie();

        assert_ok!(client.reboot().await);

        let calls = transport.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[0],
            Call::Get {
                path: "/restart.htm".to_string(),
                cookie: cookie.clone(),
            }
        );
        match &calls[1] {
            Call::Get { path, cookie: c } => {
                assert!(path.starts_with("/cgi/cgi_Restart.js?t="));
                assert!(path["/cgi/cgi_Restart.js?t=".len()..].parse::<i64>().is_ok());
                assert_eq!(c, &cookie);
            }
            other => panic!("expected script GET, got {:?}", other),
        }
        assert_eq!(
            calls[2],
            Call::Post {
                path: "/apply.cgi".to_string(),
                cookie,
                content_type: "text/plain".to_string(),
                body: "CMD=&GO=basic_-_restart.htm&SET0=TOKEN42%3DREBOOT&pi=XYZ123".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_reset_request_sequence() {
        let transport = Arc::new(FakeTransport::with_pages(&[
            ("/system.htm", SYSTEM_PAGE),
            ("/cgi/cgi_system.js", "var x=[0,sysFlag,1];"),
        ]));
        let client = client_with(&transport);

        assert_ok!(client.reset().await);

        let calls = transport.calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(&calls[0], Call::Get { path, .. } if path == "/system.htm"));
        assert!(matches!(&calls[1], Call::Get { path, .. } if path.starts_with("/cgi/cgi_system.js?t=")));
        assert!(matches!(
            &calls[2],
            Call::Post { path, body, .. }
                if path == "/apply.cgi"
                    && body == "CMD=&GO=system.htm&SET0=sysFlag%3DRESTORE&pi=SYS789"
        ));
    }

    #[tokio::test]
    async fn test_missing_meta_aborts_without_apply() {
        let transport = Arc::new(FakeTransport::with_pages(&[
            ("/restart.htm", "<html><title>Login required</title></html>"),
            ("/cgi/cgi_Restart.js", "foo,TOKEN42,bar"),
        ]));
        let client = client_with(&transport);

        let err = assert_err!(client.reboot().await);
        match err {
            AppError::Extraction { path, token } => {
                assert_eq!(path, "/restart.htm");
                assert_eq!(token, crate::router::scrape::TokenKind::Page);
            }
            other => panic!("expected extraction error, got {:?}", other),
        }

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls.iter().all(|c| matches!(c, Call::Get { .. })));
    }

    #[tokio::test]
    async fn test_missing_parameter_token_aborts_without_apply() {
        let transport = Arc::new(FakeTransport::with_pages(&[
            ("/system.htm", SYSTEM_PAGE),
            ("/cgi/cgi_system.js", "404 not found"),
        ]));
        let client = client_with(&transport);

        let err = assert_err!(client.reset().await);
        assert!(matches!(
            err,
            AppError::Extraction { ref path, token: crate::router::scrape::TokenKind::Parameter }
                if path == "/cgi/cgi_system.js"
        ));
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_apply_failure_is_swallowed() {
        let transport = Arc::new(FakeTransport {
            fail_posts_to: Some("/apply.cgi"),
            ..FakeTransport::with_pages(&[
                ("/restart.htm", RESTART_PAGE),
                ("/cgi/cgi_Restart.js", "foo,TOKEN42,bar"),
            ])
        });
        let client = client_with(&transport);

        assert_ok!(client.reboot().await);
        assert_eq!(transport.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_session_stable_across_requests() {
        let transport = Arc::new(FakeTransport::with_pages(&[
            ("/restart.htm", RESTART_PAGE),
            ("/cgi/cgi_Restart.js", "foo,TOKEN42,bar"),
        ]));
        let client = client_with(&transport);

        client.login("pw").await.unwrap();
        client.reboot().await.unwrap();

        let expected = client.session().cookie();
        for call in transport.calls() {
            let cookie = match call {
                Call::Get { cookie, .. } | Call::Post { cookie, .. } => cookie,
            };
            assert_eq!(cookie, expected);
        }
    }
}
