//! Error types for the Kuberhealthy client.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by [`crate::KuberhealthyClient`] and the deadline source.
#[derive(Debug, Error)]
pub enum ClientError {
    /// `KH_REPORTING_URL` was not present in the environment.
    #[error("KH_REPORTING_URL environment variable is not set")]
    MissingReportingUrl,

    /// `KH_CHECK_RUN_DEADLINE` was not present in the environment.
    #[error("KH_CHECK_RUN_DEADLINE environment variable is not set")]
    DeadlineUnset,

    /// `KH_CHECK_RUN_DEADLINE` did not hold a unix timestamp.
    #[error("failed to parse KH_CHECK_RUN_DEADLINE: {0}")]
    DeadlineInvalid(#[from] std::num::ParseIntError),

    /// `KH_CHECK_RUN_DEADLINE` held a timestamp chrono cannot represent.
    #[error("KH_CHECK_RUN_DEADLINE timestamp {0} is out of range")]
    DeadlineOutOfRange(i64),

    /// Transport-level failure talking to the reporting endpoint.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The reporting endpoint answered with a non-success status.
    #[error("reporting endpoint returned {0}")]
    UnexpectedStatus(reqwest::StatusCode),

    /// The reporting endpoint never answered within the probe bound.
    #[error("reporting endpoint was not reachable within {0:?}")]
    NotReachable(Duration),
}
