// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store error taxonomy.

use queuectl_core::{JobId, JobState, WorkerId};
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by [`crate::Store`] operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("job not found: {0}")]
    NotFound(String),

    #[error("ambiguous job id prefix '{prefix}' ({count} matches)")]
    AmbiguousId { prefix: String, count: usize },

    #[error("job {id} is {state}, only dead jobs can be requeued")]
    NotDead { id: JobId, state: JobState },

    #[error("job {id} is not processing under worker {worker_id}")]
    StaleClaim { id: JobId, worker_id: WorkerId },

    #[error("no queue database at {} (run `queuectl initdb` first)", path.display())]
    Uninitialized { path: PathBuf },

    #[error("queue database schema v{found} is newer than supported v{supported}; refusing to downgrade")]
    SchemaTooNew { found: i64, supported: i64 },

    #[error("corrupt row for job {id}: {reason}")]
    Corrupt { id: String, reason: String },

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl StoreError {
    /// True for failures worth retrying with backoff (the database file is
    /// busy or temporarily unreachable), as opposed to contract violations.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Sqlx(_))
    }
}
