//! netrecover - home network recovery
//!
//! Checks for internet connectivity and, if it is missing, escalates:
//! WiFi reconnect, router reboot, router factory reset.

mod config;
mod error;
mod escalation;
mod notify;
mod router;
mod wireless;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::escalation::{EscalationController, Outcome};
use crate::notify::DiscordNotifier;
use crate::router::{HttpRouterFactory, HttpTransport};
use crate::wireless::SystemWirelessConnector;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "netrecover=info".into()),
        )
        .init();

    match run().await {
        Ok(Outcome::Online(stage)) => {
            tracing::info!("Online after {}", stage);
            ExitCode::SUCCESS
        }
        Ok(Outcome::Exhausted) => {
            tracing::error!("Every recovery stage ran and the network is still down");
            ExitCode::from(1)
        }
        Err(e) => {
            tracing::error!("Recovery aborted: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run() -> anyhow::Result<Outcome> {
    let config = config::Config::load()?;
    tracing::info!(
        "Configuration loaded: router={}, ssid={}",
        config.router.ip,
        config.wireless.ssid
    );

    let transport = HttpTransport::new(
        config.router_base_url()?,
        Duration::from_secs(config.router.timeout_secs),
    )?;

    let controller = EscalationController::new(
        &config,
        Arc::new(DiscordNotifier::new(&config.notify)),
        Arc::new(SystemWirelessConnector::default()),
        Arc::new(HttpRouterFactory::new(
            Arc::new(transport),
            config.router.username.clone(),
        )),
    );

    Ok(controller.run().await?)
}
