//! Escalation ladder
//!
//! Probe, then reconnect WiFi, then reboot the router, then factory reset it,
//! probing after each step and stopping at the first success. Every stage runs
//! once, in order, with fixed settle pauses in between.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, TimingConfig};
use crate::error::AppError;
use crate::notify::ConnectivityProbe;
use crate::router::RouterSessionFactory;
use crate::wireless::WirelessConnector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    InitialProbe,
    Reconnect,
    Reboot,
    FactoryReset,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::InitialProbe => "initial probe",
            Stage::Reconnect => "wireless reconnect",
            Stage::Reboot => "router reboot",
            Stage::FactoryReset => "factory reset",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Connectivity confirmed after this stage
    Online(Stage),
    /// Every stage ran and the network is still down
    Exhausted,
}

pub struct EscalationController {
    probe: Arc<dyn ConnectivityProbe>,
    wireless: Arc<dyn WirelessConnector>,
    routers: Arc<dyn RouterSessionFactory>,
    ssid: String,
    password: String,
    timing: TimingConfig,
}

impl EscalationController {
    pub fn new(
        config: &Config,
        probe: Arc<dyn ConnectivityProbe>,
        wireless: Arc<dyn WirelessConnector>,
        routers: Arc<dyn RouterSessionFactory>,
    ) -> Self {
        Self {
            probe,
            wireless,
            routers,
            ssid: config.wireless.ssid.clone(),
            password: config.router.password.clone(),
            timing: config.timing.clone(),
        }
    }

    /// Run the whole ladder. Only an extraction failure aborts early.
    pub async fn run(&self) -> Result<Outcome, AppError> {
        tracing::info!("[Escalation] Checking connection");
        if self.probe.probe().await {
            return Ok(Outcome::Online(Stage::InitialProbe));
        }

        self.pause(self.timing.stage_pause_secs).await;
        self.wireless.connect(&self.ssid).await;
        tracing::info!("[Escalation] Giving it a few seconds to establish the connection");
        self.pause(self.timing.wifi_settle_secs).await;
        if self.check(Stage::Reconnect).await {
            return Ok(Outcome::Online(Stage::Reconnect));
        }

        self.pause(self.timing.stage_pause_secs).await;
        self.router_stage(Stage::Reboot).await?;
        tracing::info!("[Escalation] Waiting a few minutes for the reboot to process");
        self.pause(self.timing.reboot_wait_secs).await;
        if self.check(Stage::Reboot).await {
            return Ok(Outcome::Online(Stage::Reboot));
        }

        self.router_stage(Stage::FactoryReset).await?;
        tracing::info!("[Escalation] Waiting a few minutes for the reset to process");
        self.pause(self.timing.reset_wait_secs).await;
        if self.check(Stage::FactoryReset).await {
            return Ok(Outcome::Online(Stage::FactoryReset));
        }

        tracing::warn!("[Escalation] Still no joy! Who would have thought...");
        Ok(Outcome::Exhausted)
    }

    async fn check(&self, after: Stage) -> bool {
        tracing::info!("[Escalation] Checking connection after {}", after);
        self.probe.probe().await
    }

    /// Fresh admin session, login, then the stage's command. Login success is not
    /// verified; a bad password surfaces as an extraction error.
    async fn router_stage(&self, stage: Stage) -> Result<(), AppError> {
        tracing::info!("[Escalation] Attempting a {}", stage);

        let admin = self.routers.open();
        let result = match admin.login(&self.password).await {
            Ok(()) => match stage {
                Stage::Reboot => admin.reboot().await,
                _ => admin.reset().await,
            },
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) if e.is_fatal() => {
                tracing::error!("[Escalation] {} aborted: {}", stage, e);
                Err(e)
            }
            Err(e) => {
                // Router unreachable: carry on, the wait-and-probe still decides
                tracing::warn!("[Escalation] {} failed, continuing: {}", stage, e);
                Ok(())
            }
        }
    }

    async fn pause(&self, secs: u64) {
        if secs > 0 {
            tokio::time::sleep(Duration::from_secs(secs)).await;
        }
    }
}
