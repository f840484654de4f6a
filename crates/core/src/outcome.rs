// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Result of one execution attempt.

use serde::{Deserialize, Serialize};

/// What happened when the executor ran a job's command once.
///
/// Exit code zero is the only success signal; everything else (non-zero
/// exit, timeout, failure to spawn at all) flows through the retry machinery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Outcome {
    Succeeded {
        stdout_tail: String,
        stderr_tail: String,
    },
    FailedNonZero {
        exit_code: i64,
        stdout_tail: String,
        stderr_tail: String,
    },
    /// The child was killed after the per-worker timeout elapsed.
    TimedOut {
        stdout_tail: String,
        stderr_tail: String,
    },
    /// The child could not be launched at all (e.g. shell missing).
    SpawnFailed { message: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded { .. })
    }

    /// The child's exit code, when one exists.
    pub fn exit_code(&self) -> Option<i64> {
        match self {
            Outcome::Succeeded { .. } => Some(0),
            Outcome::FailedNonZero { exit_code, .. } => Some(*exit_code),
            Outcome::TimedOut { .. } | Outcome::SpawnFailed { .. } => None,
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Succeeded { .. } => "succeeded",
            Outcome::FailedNonZero { .. } => "failed",
            Outcome::TimedOut { .. } => "timed_out",
            Outcome::SpawnFailed { .. } => "spawn_failed",
        }
    }
}
