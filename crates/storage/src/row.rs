// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Raw row ↔ [`Job`] mapping.

use crate::StoreError;
use chrono::{DateTime, Utc};
use queuectl_core::{Job, JobId, JobState, WorkerId};

/// Column list shared by every statement that reads or returns a full job.
pub(crate) const JOB_COLUMNS: &str = "id, command, state, priority, max_retries, attempts, \
     run_at, created_at, updated_at, last_exit_code, stdout_tail, stderr_tail, \
     worker_id, claimed_at";

/// Jobs table row as stored. Timestamps are epoch milliseconds UTC.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct JobRow {
    pub(crate) id: String,
    pub(crate) command: String,
    pub(crate) state: String,
    pub(crate) priority: i64,
    pub(crate) max_retries: i64,
    pub(crate) attempts: i64,
    pub(crate) run_at: i64,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
    pub(crate) last_exit_code: Option<i64>,
    pub(crate) stdout_tail: Option<String>,
    pub(crate) stderr_tail: Option<String>,
    pub(crate) worker_id: Option<String>,
    pub(crate) claimed_at: Option<i64>,
}

impl TryFrom<JobRow> for Job {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| StoreError::Corrupt {
            id: row.id.clone(),
            reason,
        };

        let state: JobState = row
            .state
            .parse()
            .map_err(|e| corrupt(format!("{e}")))?;
        let max_retries = u32::try_from(row.max_retries)
            .map_err(|_| corrupt(format!("negative max_retries {}", row.max_retries)))?;
        let attempts = u32::try_from(row.attempts)
            .map_err(|_| corrupt(format!("negative attempts {}", row.attempts)))?;

        Ok(Job {
            id: JobId::new(row.id.clone()),
            command: row.command,
            state,
            priority: row.priority,
            max_retries,
            attempts,
            run_at: epoch_ms_to_datetime(row.run_at).map_err(&corrupt)?,
            created_at: epoch_ms_to_datetime(row.created_at).map_err(&corrupt)?,
            updated_at: epoch_ms_to_datetime(row.updated_at).map_err(&corrupt)?,
            last_exit_code: row.last_exit_code,
            stdout_tail: row.stdout_tail,
            stderr_tail: row.stderr_tail,
            worker_id: row.worker_id.map(WorkerId::new),
            claimed_at: row
                .claimed_at
                .map(epoch_ms_to_datetime)
                .transpose()
                .map_err(&corrupt)?,
        })
    }
}

pub(crate) fn epoch_ms_to_datetime(ms: i64) -> Result<DateTime<Utc>, String> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .ok_or_else(|| format!("invalid epoch millis timestamp: {ms}"))
}

pub(crate) fn datetime_to_epoch_ms(t: DateTime<Utc>) -> i64 {
    t.timestamp_millis()
}

#[cfg(test)]
#[path = "row_tests.rs"]
mod tests;
