//! Wireless reconnect via the OS network manager
//!
//! Uses `tokio::process::Command`. Joins a saved profile by name; the join itself
//! completes asynchronously inside the OS, so callers wait before probing.

use async_trait::async_trait;
use tokio::process::Command;

#[async_trait]
pub trait WirelessConnector: Send + Sync {
    /// Ask the OS to join `ssid`. Never fails; problems are logged.
    async fn connect(&self, ssid: &str);
}

/// Network manager command line for the current platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkManager {
    /// Windows `netsh wlan`
    Netsh,
    /// NetworkManager `nmcli`
    Nmcli,
}

impl NetworkManager {
    pub fn detect() -> Self {
        if cfg!(windows) {
            NetworkManager::Netsh
        } else {
            NetworkManager::Nmcli
        }
    }

    /// Program and arguments to join a saved profile
    pub fn join_command(&self, ssid: &str) -> (&'static str, Vec<String>) {
        match self {
            NetworkManager::Netsh => (
                "netsh",
                vec![
                    "wlan".to_string(),
                    "connect".to_string(),
                    format!("name={}", ssid),
                    format!("ssid={}", ssid),
                ],
            ),
            NetworkManager::Nmcli => (
                "nmcli",
                vec![
                    "connection".to_string(),
                    "up".to_string(),
                    "id".to_string(),
                    ssid.to_string(),
                ],
            ),
        }
    }
}

pub struct SystemWirelessConnector {
    manager: NetworkManager,
}

impl SystemWirelessConnector {
    pub fn new(manager: NetworkManager) -> Self {
        Self { manager }
    }
}

impl Default for SystemWirelessConnector {
    fn default() -> Self {
        Self::new(NetworkManager::detect())
    }
}

#[async_trait]
impl WirelessConnector for SystemWirelessConnector {
    async fn connect(&self, ssid: &str) {
        tracing::info!("Connecting to {}", ssid);

        let (program, args) = self.manager.join_command(ssid);
        // Exit status is informational only: some drivers report failure yet still join
        let output = match Command::new(program).args(&args).output().await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("Failed to run {}: {}", program, e);
                return;
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        if stdout.is_empty() {
            tracing::info!("> {}", String::from_utf8_lossy(&output.stderr).trim());
        } else {
            tracing::info!("> {}", stdout);
        }

        if !output.status.success() {
            tracing::warn!("{} exited with {}", program, output.status);
        }
    }
}
