//! Error handling module

use thiserror::Error;

use crate::router::scrape::TokenKind;

#[derive(Error, Debug)]
pub enum AppError {
    /// Network, DNS or timeout failure. Treated as "offline", never fatal on its own.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// An expected token was missing from a scraped router response.
    /// Usually a firmware mismatch or a failed login.
    #[error("Could not extract {token} from {path} (wrong firmware or bad credentials?)")]
    Extraction { path: String, token: TokenKind },

    /// The final apply request failed. The router may already be restarting.
    #[error("Command send error: {0}")]
    CommandSend(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Whether this error must stop the escalation ladder
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Extraction { .. } | AppError::ConfigError(_))
    }
}
