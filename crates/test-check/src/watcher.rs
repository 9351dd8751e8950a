//! Fail-safe timeout for the whole run.
//!
//! The watcher is armed once, strictly before the delay/readiness/report
//! sequence, and fires at most once. Firing terminates the process with a
//! non-zero status; no verdict is submitted, and the collector infers the
//! timeout from the silence plus its own deadline tracking.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Handle to the armed fail-safe timer.
pub struct TimeoutWatcher {
    completed: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl TimeoutWatcher {
    /// Arm a one-shot fail-safe that force-exits the process once
    /// `time_limit` elapses, unless [`disarm`](Self::disarm) runs first.
    ///
    /// A zero budget skips arming entirely rather than firing
    /// immediately, so a legitimately fast report never races a
    /// zero-length timer.
    pub fn arm(time_limit: Duration) -> Self {
        Self::arm_with_action(time_limit, || {
            error!("check took too long and timed out");
            std::process::exit(1);
        })
    }

    pub(crate) fn arm_with_action<F>(time_limit: Duration, action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let completed = Arc::new(AtomicBool::new(false));

        if time_limit.is_zero() {
            warn!("time limit is non-positive, skipping timeout watcher");
            return Self {
                completed,
                task: None,
            };
        }

        info!(
            time_limit = %humantime::format_duration(time_limit),
            "check time limit set"
        );

        let flag = Arc::clone(&completed);
        let task = tokio::spawn(async move {
            tokio::time::sleep(time_limit).await;
            // Re-check after waking: a verdict may have been reported
            // between the timer firing and this task being polled.
            if !flag.load(Ordering::SeqCst) {
                action();
            }
        });

        Self {
            completed,
            task: Some(task),
        }
    }

    /// Mark the run as completed; the fail-safe will never fire after
    /// this returns.
    pub fn disarm(&self) {
        self.completed.store(true, Ordering::SeqCst);
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}
