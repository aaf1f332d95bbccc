//! Configuration module

use serde::Deserialize;

use crate::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub router: RouterConfig,
    pub wireless: WirelessConfig,
    pub notify: NotifyConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    /// Router LAN address, e.g. 192.168.1.254
    pub ip: String,
    #[serde(default = "default_router_username")]
    pub username: String,
    pub password: String,
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WirelessConfig {
    /// Saved profile name, also used as the SSID
    pub ssid: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    pub webhook_url: String,
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

/// Fixed pauses between escalation stages (seconds)
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_stage_pause")]
    pub stage_pause_secs: u64,
    #[serde(default = "default_wifi_settle")]
    pub wifi_settle_secs: u64,
    #[serde(default = "default_router_settle")]
    pub reboot_wait_secs: u64,
    #[serde(default = "default_router_settle")]
    pub reset_wait_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            stage_pause_secs: default_stage_pause(),
            wifi_settle_secs: default_wifi_settle(),
            reboot_wait_secs: default_router_settle(),
            reset_wait_secs: default_router_settle(),
        }
    }
}

fn default_router_username() -> String {
    "admin".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_stage_pause() -> u64 {
    10
}

fn default_wifi_settle() -> u64 {
    10
}

fn default_router_settle() -> u64 {
    300
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("NETRECOVER").separator("__"))
            .build()?;

        Ok(Self::from_settings(settings)?)
    }

    /// Deserialize and validate an already-built settings tree
    pub fn from_settings(settings: config::Config) -> Result<Self, AppError> {
        let config: Config = settings
            .try_deserialize()
            .map_err(|e| AppError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("router.ip", &self.router.ip),
            ("router.password", &self.router.password),
            ("wireless.ssid", &self.wireless.ssid),
            ("notify.webhook_url", &self.notify.webhook_url),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::ConfigError(format!("{} must not be empty", key)));
            }
        }

        self.router_base_url()?;
        url::Url::parse(&self.notify.webhook_url).map_err(|e| {
            AppError::ConfigError(format!("notify.webhook_url is not a valid URL: {}", e))
        })?;

        Ok(())
    }

    /// Base URL of the router admin panel (always plain HTTP on this firmware)
    pub fn router_base_url(&self) -> Result<url::Url, AppError> {
        let url = url::Url::parse(&format!("http://{}/", self.router.ip.trim()))
            .map_err(|e| AppError::ConfigError(format!("router.ip is not a valid host: {}", e)))?;
        if url.path() != "/" || url.query().is_some() {
            return Err(AppError::ConfigError(format!(
                "router.ip must be a bare host, got {}",
                self.router.ip
            )));
        }
        Ok(url)
    }
}
