//! Client for reporting external check results to a Kuberhealthy server.
//!
//! Checker pods receive the collector endpoint and their run deadline
//! through environment variables injected by Kuberhealthy:
//! - `KH_REPORTING_URL`: where the verdict is POSTed
//! - `KH_CHECK_RUN_DEADLINE`: unix timestamp the run must report by
//!
//! The client submits exactly one verdict per call and never retries;
//! retry policy belongs to the caller (or nobody, for one-shot checks).

mod error;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

pub use error::ClientError;

/// Environment variable holding the collector endpoint URL.
pub const REPORTING_URL_ENV: &str = "KH_REPORTING_URL";

/// Environment variable holding the run deadline as unix seconds.
pub const RUN_DEADLINE_ENV: &str = "KH_CHECK_RUN_DEADLINE";

/// Maximum time to establish a TCP connection to the collector.
const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default total request timeout (connection + transfer).
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Pause between reachability probes.
const REACHABILITY_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Verdict payload POSTed to the Kuberhealthy reporting endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Human-readable failure reasons; empty on success.
    #[serde(rename = "Errors")]
    pub errors: Vec<String>,
    /// Whether the check passed.
    #[serde(rename = "OK")]
    pub ok: bool,
}

impl Report {
    /// A passing verdict.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            errors: Vec::new(),
            ok: true,
        }
    }

    /// A failing verdict carrying the given reasons.
    #[must_use]
    pub fn failed(reasons: Vec<String>) -> Self {
        Self {
            errors: reasons,
            ok: false,
        }
    }
}

/// Configuration for the Kuberhealthy client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Collector endpoint URL; `None` when `KH_REPORTING_URL` is unset.
    pub reporting_url: Option<String>,
    /// Log request payloads and probe attempts at DEBUG level.
    pub debug: bool,
    /// Total request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            reporting_url: std::env::var(REPORTING_URL_ENV).ok(),
            debug: false,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Client for submitting check verdicts to Kuberhealthy.
#[derive(Debug, Clone)]
pub struct KuberhealthyClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl KuberhealthyClient {
    /// Create a client with the given configuration.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, http })
    }

    /// The collector endpoint URL, if one was configured.
    #[must_use]
    pub fn reporting_url(&self) -> Option<&str> {
        self.config.reporting_url.as_deref()
    }

    /// Submit a passing verdict.
    ///
    /// # Errors
    /// Returns the transport error from the single submission attempt.
    pub async fn report_success(&self) -> Result<(), ClientError> {
        self.post_report(&Report::ok()).await
    }

    /// Submit a failing verdict with the given reasons.
    ///
    /// # Errors
    /// Returns the transport error from the single submission attempt.
    pub async fn report_failure(&self, reasons: Vec<String>) -> Result<(), ClientError> {
        self.post_report(&Report::failed(reasons)).await
    }

    async fn post_report(&self, report: &Report) -> Result<(), ClientError> {
        let url = self
            .config
            .reporting_url
            .as_deref()
            .ok_or(ClientError::MissingReportingUrl)?;

        if self.config.debug {
            debug!(url, ok = report.ok, errors = ?report.errors, "submitting report");
        }

        let response = self.http.post(url).json(report).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus(status));
        }

        Ok(())
    }

    /// Block until the reporting endpoint answers any HTTP request, or
    /// `bound` expires.
    ///
    /// Reachability is transport-level: an error status still proves the
    /// endpoint is up, so only connection failures keep the probe looping.
    ///
    /// # Errors
    /// Returns [`ClientError::NotReachable`] when the bound expires, or
    /// [`ClientError::MissingReportingUrl`] when no endpoint is configured.
    pub async fn wait_until_reachable(&self, bound: Duration) -> Result<(), ClientError> {
        let url = self
            .config
            .reporting_url
            .as_deref()
            .ok_or(ClientError::MissingReportingUrl)?;

        let probe = async {
            loop {
                match self.http.get(url).send().await {
                    Ok(response) => {
                        if self.config.debug {
                            debug!(url, status = %response.status(), "reporting endpoint is reachable");
                        }
                        return;
                    }
                    Err(err) => {
                        if self.config.debug {
                            warn!(url, error = %err, "reporting endpoint not reachable yet");
                        }
                    }
                }
                tokio::time::sleep(REACHABILITY_POLL_INTERVAL).await;
            }
        };

        tokio::time::timeout(bound, probe)
            .await
            .map_err(|_| ClientError::NotReachable(bound))
    }
}

/// Read the run deadline injected by Kuberhealthy.
///
/// # Errors
/// Returns an error when `KH_CHECK_RUN_DEADLINE` is unset, malformed, or
/// out of range.
pub fn get_deadline() -> Result<DateTime<Utc>, ClientError> {
    let raw = std::env::var(RUN_DEADLINE_ENV).map_err(|_| ClientError::DeadlineUnset)?;
    let unix: i64 = raw.trim().parse()?;
    DateTime::<Utc>::from_timestamp(unix, 0).ok_or(ClientError::DeadlineOutOfRange(unix))
}
