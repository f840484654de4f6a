// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker and supervisor configuration.
//!
//! The store path is plumbed through these structs; there is no ambient
//! global anywhere in the engine.

use queuectl_core::WorkerId;
use std::path::PathBuf;
use std::time::Duration;

/// Default sleep between empty polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default drain window granted to workers on shutdown.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(30);

/// Floor for the orphan-reap threshold.
pub const MIN_REAP_THRESHOLD: Duration = Duration::from_secs(300);

/// Poll iterations between orphan-reap sweeps.
pub const REAP_EVERY_POLLS: u32 = 30;

/// Per-worker settings.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub worker_id: WorkerId,
    /// Sleep between empty polls; jitter of up to a quarter interval is
    /// added so a pool of workers does not hammer the store in lockstep.
    pub poll_interval: Duration,
    /// Per-job execution timeout. `None` means unbounded.
    pub timeout: Option<Duration>,
    /// Claims older than this are treated as orphaned.
    pub reap_threshold: Duration,
}

impl WorkerConfig {
    pub fn new(worker_id: WorkerId) -> Self {
        Self {
            worker_id,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
            reap_threshold: reap_threshold(None, DEFAULT_GRACE),
        }
    }
}

/// Orphan threshold: `timeout + 2 × grace`, floored at five minutes.
/// Conservative on purpose; reaping a live worker's claim is the failure
/// mode to avoid.
pub fn reap_threshold(timeout: Option<Duration>, grace: Duration) -> Duration {
    let base = timeout.unwrap_or(Duration::ZERO) + grace * 2;
    base.max(MIN_REAP_THRESHOLD)
}

/// Supervisor settings; everything a worker child needs is derived from
/// here and passed on the child's command line.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub db_path: PathBuf,
    /// Number of worker processes to run.
    pub workers: u32,
    pub backoff_base: f64,
    pub poll_interval: Duration,
    pub timeout: Option<Duration>,
    /// Drain window before stragglers are force-killed.
    pub grace: Duration,
    /// Explicit orphan threshold; `None` derives it from timeout and grace.
    pub reap_after: Option<Duration>,
    /// Maximum worker restarts per minute before the supervisor gives up.
    pub restart_budget: u32,
}

impl SupervisorConfig {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path,
            workers: 1,
            backoff_base: queuectl_core::DEFAULT_BACKOFF_BASE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
            grace: DEFAULT_GRACE,
            reap_after: None,
            restart_budget: 5,
        }
    }

    pub fn reap_threshold(&self) -> Duration {
        self.reap_after
            .unwrap_or_else(|| reap_threshold(self.timeout, self.grace))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
