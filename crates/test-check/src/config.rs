//! Run configuration resolved from the environment and the check deadline.

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

/// Environment variable forcing a failure verdict.
pub const REPORT_FAILURE_ENV: &str = "REPORT_FAILURE";

/// Environment variable holding the artificial pre-report delay.
pub const REPORT_DELAY_ENV: &str = "REPORT_DELAY";

/// Delay before reporting when `REPORT_DELAY` is unset.
pub const DEFAULT_REPORT_DELAY: Duration = Duration::from_secs(5);

/// Buffer subtracted from the deadline so the report call itself has
/// time to complete.
pub const TIME_LIMIT_SKEW: Duration = Duration::from_secs(5);

/// Budget used when the deadline is missing or already too close.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(10 * 60);

/// Fatal configuration errors. These abort the run before any normal
/// reporting happens; deadline problems are deliberately not in here.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse {var} env var: invalid boolean value {value:?}")]
    InvalidBool { var: &'static str, value: String },

    #[error("failed to parse {var} env var: {source}")]
    InvalidDuration {
        var: &'static str,
        #[source]
        source: humantime::DurationError,
    },
}

/// Immutable configuration for one check run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Force the verdict to failure.
    pub report_failure: bool,
    /// Artificial wait before reporting, to model a slow check.
    pub report_delay: Duration,
    /// Remaining safe budget before the external deadline; always
    /// positive.
    pub time_limit: Duration,
}

/// Build the run configuration from environment variables and the
/// deadline injected by Kuberhealthy.
///
/// # Errors
/// Returns a [`ConfigError`] when `REPORT_FAILURE` or `REPORT_DELAY`
/// is malformed. A missing or too-close deadline is *not* an error:
/// it logs a warning and falls back to [`DEFAULT_TIME_LIMIT`].
pub fn resolve() -> Result<RunConfig, ConfigError> {
    let report_failure = parse_report_failure()?;
    let report_delay = parse_report_delay()?;
    let time_limit = resolve_time_limit();

    Ok(RunConfig {
        report_failure,
        report_delay,
        time_limit,
    })
}

/// Read `REPORT_FAILURE`, defaulting to `false` when unset or empty.
pub fn parse_report_failure() -> Result<bool, ConfigError> {
    let Ok(raw) = std::env::var(REPORT_FAILURE_ENV) else {
        return Ok(false);
    };
    if raw.is_empty() {
        return Ok(false);
    }

    parse_bool(&raw).ok_or(ConfigError::InvalidBool {
        var: REPORT_FAILURE_ENV,
        value: raw,
    })
}

// The value set Go's strconv.ParseBool accepts; existing check
// manifests use values like "1" and "True".
fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Read `REPORT_DELAY`, defaulting to [`DEFAULT_REPORT_DELAY`] when
/// unset or empty.
///
/// Fractional units (`"1.5s"`) are not accepted, unlike Go's
/// `time.ParseDuration`; write `1500ms` instead.
pub fn parse_report_delay() -> Result<Duration, ConfigError> {
    let Ok(raw) = std::env::var(REPORT_DELAY_ENV) else {
        return Ok(DEFAULT_REPORT_DELAY);
    };
    if raw.is_empty() {
        return Ok(DEFAULT_REPORT_DELAY);
    }

    humantime::parse_duration(&raw).map_err(|source| ConfigError::InvalidDuration {
        var: REPORT_DELAY_ENV,
        source,
    })
}

/// Time remaining until `deadline`, minus [`TIME_LIMIT_SKEW`].
/// `None` when the budget is already spent.
pub fn compute_time_limit(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Option<Duration> {
    let skew = chrono::Duration::from_std(TIME_LIMIT_SKEW).ok()?;
    (deadline - now - skew)
        .to_std()
        .ok()
        .filter(|limit| !limit.is_zero())
}

// Deadline unavailability is a soft condition: warn and substitute the
// default budget so a collector hiccup never turns into a config abort.
fn resolve_time_limit() -> Duration {
    let deadline = match checkclient::get_deadline() {
        Ok(deadline) => deadline,
        Err(err) => {
            warn!(error = %err, "there was an issue getting the check deadline");
            return DEFAULT_TIME_LIMIT;
        }
    };

    match compute_time_limit(deadline, Utc::now()) {
        Some(limit) => limit,
        None => {
            warn!(%deadline, "check deadline is too soon to honor");
            DEFAULT_TIME_LIMIT
        }
    }
}
