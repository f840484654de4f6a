// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job entity and state machine vocabulary.

use crate::worker::WorkerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for an enqueued job.
///
/// Minted at enqueue time as an opaque UUID string and stable for the
/// life of the job. List views abbreviate it via [`JobId::short`]; the
/// store resolves abbreviated prefixes back to full ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id for a newly enqueued job.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading `len` characters, or the whole id when it is shorter.
    pub fn short(&self, len: usize) -> &str {
        self.0.get(..len).unwrap_or(&self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a job.
///
/// `Pending` and `FailedTransient` are both claimable ("ready") once their
/// `run_at` has passed; they stay distinct so listings can tell "never ran"
/// from "awaiting retry" without inspecting `attempts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Processing,
    Completed,
    FailedTransient,
    Dead,
}

impl JobState {
    pub const fn as_str(self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Processing => "processing",
            JobState::Completed => "completed",
            JobState::FailedTransient => "failed_transient",
            JobState::Dead => "dead",
        }
    }

    /// Terminal states have no outgoing transitions except explicit requeue
    /// from `Dead`.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Dead)
    }

    /// States eligible for claiming once `run_at` has passed.
    pub fn is_ready(self) -> bool {
        matches!(self, JobState::Pending | JobState::FailedTransient)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized job state label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid job state: {0} (expected pending, processing, completed, failed_transient, or dead)")]
pub struct ParseJobStateError(pub String);

impl FromStr for JobState {
    type Err = ParseJobStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobState::Pending),
            "processing" => Ok(JobState::Processing),
            "completed" => Ok(JobState::Completed),
            "failed_transient" => Ok(JobState::FailedTransient),
            "dead" => Ok(JobState::Dead),
            other => Err(ParseJobStateError(other.to_string())),
        }
    }
}

/// A persisted job.
///
/// The store exclusively owns the authoritative copy; workers hold a logical
/// lease via `(worker_id, claimed_at)` while the job is `Processing` and
/// never mutate a `Job` in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    /// Shell command line, interpreted by `sh -c` at execution time.
    pub command: String,
    pub state: JobState,
    /// Higher priority is dequeued earlier.
    pub priority: i64,
    /// Total allowed failed attempts before the job moves to the DLQ.
    pub max_retries: u32,
    /// Completed execution attempts, regardless of outcome.
    pub attempts: u32,
    /// Earliest instant a worker may claim this job.
    pub run_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_exit_code: Option<i64>,
    /// Trailing capture of the most recent attempt's stdout.
    pub stdout_tail: Option<String>,
    /// Trailing capture of the most recent attempt's stderr.
    pub stderr_tail: Option<String>,
    /// Claiming worker; set exactly while `state == Processing`.
    pub worker_id: Option<WorkerId>,
    pub claimed_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// True when a worker may claim this job at `now`.
    pub fn is_ready(&self, now: DateTime<Utc>) -> bool {
        self.state.is_ready() && self.run_at <= now
    }
}

/// Parameters for enqueueing a job.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub command: String,
    pub priority: i64,
    pub max_retries: u32,
    /// Earliest execution time; `None` means immediately.
    pub run_at: Option<DateTime<Utc>>,
}

/// Default retry budget for new jobs.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

impl NewJob {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            priority: 0,
            max_retries: DEFAULT_MAX_RETRIES,
            run_at: None,
        }
    }

    pub fn priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn run_at(mut self, run_at: DateTime<Utc>) -> Self {
        self.run_at = Some(run_at);
        self
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
