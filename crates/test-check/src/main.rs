//! Synthetic Kuberhealthy check.
//!
//! Simulates a test workload: waits a configured delay, then reports a
//! configured pass/fail verdict to the Kuberhealthy collector before the
//! run deadline. Exists to validate the surrounding check pipeline
//! (scheduling, pod launch, result collection), not any real workload.
//!
//! Exit codes: 0 when the verdict submission succeeds; 1 on a
//! configuration failure, a report transport failure, or a forced
//! timeout.

mod config;
mod runner;
mod watcher;

use checkclient::{ClientConfig, KuberhealthyClient};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let client = match KuberhealthyClient::new(ClientConfig {
        debug: true,
        ..ClientConfig::default()
    }) {
        Ok(client) => client,
        Err(err) => {
            error!(error = %err, "failed to build the reporting client");
            std::process::exit(1);
        }
    };

    match client.reporting_url() {
        Some(url) => info!(url, "using kuberhealthy reporting url"),
        None => warn!("KH_REPORTING_URL is not set; reporting will fail"),
    }

    let cfg = match config::resolve() {
        Ok(cfg) => cfg,
        Err(err) => {
            // Best-effort failure report; the exit status is 1 whether
            // or not it lands.
            if let Err(report_err) = runner::report_config_failure(&client, &err).await {
                error!(error = %report_err, "error when reporting to kuberhealthy");
            }
            std::process::exit(1);
        }
    };

    match runner::run(&cfg, &client).await {
        Ok(()) => info!("successfully reported to kuberhealthy servers"),
        Err(err) => {
            error!(error = %err, "error reporting to kuberhealthy servers");
            std::process::exit(1);
        }
    }
}
