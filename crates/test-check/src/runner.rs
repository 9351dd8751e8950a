//! The check run: arm the fail-safe, wait, gate on reachability, report.

use std::time::Duration;

use async_trait::async_trait;
use checkclient::{ClientError, KuberhealthyClient};
use tracing::{error, info, warn};

use crate::config::{ConfigError, RunConfig};
use crate::watcher::TimeoutWatcher;

/// How long to wait for the collector to become reachable before
/// reporting anyway. Independent of the run's overall time budget.
pub const READINESS_BOUND: Duration = Duration::from_secs(60);

/// Reason submitted with a forced failure verdict.
pub const FAILURE_REASON: &str = "Test has failed!";

/// The collector-facing side of a run: readiness probe plus verdict
/// submission.
#[async_trait]
pub trait Collector {
    async fn wait_until_reachable(&self, bound: Duration) -> Result<(), ClientError>;
    async fn report_success(&self) -> Result<(), ClientError>;
    async fn report_failure(&self, reasons: Vec<String>) -> Result<(), ClientError>;
}

#[async_trait]
impl Collector for KuberhealthyClient {
    async fn wait_until_reachable(&self, bound: Duration) -> Result<(), ClientError> {
        KuberhealthyClient::wait_until_reachable(self, bound).await
    }

    async fn report_success(&self) -> Result<(), ClientError> {
        KuberhealthyClient::report_success(self).await
    }

    async fn report_failure(&self, reasons: Vec<String>) -> Result<(), ClientError> {
        KuberhealthyClient::report_failure(self, reasons).await
    }
}

/// Execute one check run and submit exactly one verdict.
///
/// The fail-safe is armed before anything else, so a delay longer than
/// the remaining budget still trips the timeout. An unreachable
/// collector only logs a warning; the report is attempted regardless,
/// since transient unreachability may resolve by the time the POST is
/// made.
///
/// # Errors
/// Returns the transport error from the single submission attempt.
pub async fn run<C>(cfg: &RunConfig, collector: &C) -> Result<(), ClientError>
where
    C: Collector + Sync,
{
    run_with_fail_safe(cfg, collector, TimeoutWatcher::arm(cfg.time_limit)).await
}

// Split out so tests can arm a watcher whose firing action is
// observable instead of process exit.
async fn run_with_fail_safe<C>(
    cfg: &RunConfig,
    collector: &C,
    watcher: TimeoutWatcher,
) -> Result<(), ClientError>
where
    C: Collector + Sync,
{
    info!(
        delay = %humantime::format_duration(cfg.report_delay),
        "waiting before reporting"
    );
    tokio::time::sleep(cfg.report_delay).await;

    if let Err(err) = collector.wait_until_reachable(READINESS_BOUND).await {
        warn!(
            error = %err,
            "error waiting for kuberhealthy endpoint to be contactable by checker pod"
        );
    }

    let result = if cfg.report_failure {
        info!("reporting failure");
        collector
            .report_failure(vec![FAILURE_REASON.to_string()])
            .await
    } else {
        info!("reporting success");
        collector.report_success().await
    };

    watcher.disarm();
    result
}

/// Submit a failure verdict carrying a fatal configuration error's
/// message. The caller terminates the process with a non-zero status
/// afterwards, whether or not this secondary report lands.
///
/// # Errors
/// Returns the transport error from the single submission attempt.
pub async fn report_config_failure<C>(collector: &C, err: &ConfigError) -> Result<(), ClientError>
where
    C: Collector + Sync,
{
    error!(error = %err, "configuration failed");
    collector.report_failure(vec![err.to_string()]).await
}
