// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transactional job store over a single SQLite file.

use crate::row::{datetime_to_epoch_ms, JobRow, JOB_COLUMNS};
use crate::{schema, StoreError};
use chrono::{DateTime, Utc};
use queuectl_core::{BackoffPolicy, Job, JobId, JobState, NewJob, Outcome, WorkerId};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Connection busy timeout; writers are serialized by SQLite, so concurrent
/// claims briefly queue behind each other instead of failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const MAX_CONNECTIONS: u32 = 5;

/// Filter for [`Store::list`].
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub state: Option<JobState>,
    pub limit: Option<usize>,
}

/// Per-state job tallies for list footers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateCounts {
    pub pending: u64,
    pub processing: u64,
    pub completed: u64,
    pub failed_transient: u64,
    pub dead: u64,
}

impl StateCounts {
    pub fn total(&self) -> u64 {
        self.pending + self.processing + self.completed + self.failed_transient + self.dead
    }
}

/// Handle to the queue database.
///
/// Cheap to clone; all clones share one connection pool. Every mutation is a
/// guarded transition, and callers pass `now` explicitly so tests can drive
/// the clock.
#[derive(Clone, Debug)]
pub struct Store {
    pool: SqlitePool,
    backoff: BackoffPolicy,
    path: PathBuf,
}

impl Store {
    /// Open the database, creating the file and schema if needed.
    /// Idempotent; this is the `initdb` entry point.
    pub async fn create(path: &Path, backoff: BackoffPolicy) -> Result<Self, StoreError> {
        let pool = connect(path, true).await?;
        schema::ensure_schema(&pool).await?;
        Ok(Self {
            pool,
            backoff,
            path: path.to_path_buf(),
        })
    }

    /// Open an existing database. Fails when the file or schema is missing
    /// or was written by a newer build.
    pub async fn open(path: &Path, backoff: BackoffPolicy) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::Uninitialized {
                path: path.to_path_buf(),
            });
        }
        let pool = connect(path, false).await?;
        let uninitialized = || StoreError::Uninitialized {
            path: path.to_path_buf(),
        };
        schema::check_schema(&pool, uninitialized).await?;
        Ok(Self {
            pool,
            backoff,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert a new job in `pending` with `attempts = 0`.
    pub async fn enqueue(
        &self,
        id: JobId,
        new: NewJob,
        now: DateTime<Utc>,
    ) -> Result<Job, StoreError> {
        let run_at = new.run_at.unwrap_or(now);
        let row: JobRow = sqlx::query_as(&format!(
            r#"
INSERT INTO jobs (id, command, state, priority, max_retries, attempts,
                  run_at, created_at, updated_at)
VALUES (?, ?, ?, ?, ?, 0, ?, ?, ?)
RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(id.as_str())
        .bind(&new.command)
        .bind(JobState::Pending.as_str())
        .bind(new.priority)
        .bind(i64::from(new.max_retries))
        .bind(datetime_to_epoch_ms(run_at))
        .bind(datetime_to_epoch_ms(now))
        .bind(datetime_to_epoch_ms(now))
        .fetch_one(&self.pool)
        .await?;

        let job = Job::try_from(row)?;
        tracing::debug!(job_id = %job.id, priority = job.priority, "enqueued job");
        Ok(job)
    }

    /// Atomically claim the best ready job for `worker_id`, or return `None`.
    ///
    /// Selection order is `priority DESC, run_at ASC, seq ASC`. The select
    /// and the transition to `processing` happen in one statement, so two
    /// workers can never observe the same job as claimable.
    pub async fn claim_one(
        &self,
        worker_id: &WorkerId,
        now: DateTime<Utc>,
    ) -> Result<Option<Job>, StoreError> {
        let now_ms = datetime_to_epoch_ms(now);
        let row: Option<JobRow> = sqlx::query_as(&format!(
            r#"
UPDATE jobs SET
    state = ?,
    worker_id = ?,
    claimed_at = ?,
    updated_at = ?
WHERE seq = (
    SELECT seq FROM jobs
    WHERE state IN (?, ?) AND run_at <= ?
    ORDER BY priority DESC, run_at ASC, seq ASC
    LIMIT 1
)
RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(JobState::Processing.as_str())
        .bind(worker_id.as_str())
        .bind(now_ms)
        .bind(now_ms)
        .bind(JobState::Pending.as_str())
        .bind(JobState::FailedTransient.as_str())
        .bind(now_ms)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let job = Job::try_from(row)?;
                tracing::debug!(job_id = %job.id, worker_id = %worker_id, "claimed job");
                Ok(Some(job))
            }
            None => Ok(None),
        }
    }

    /// Record the outcome of an execution attempt, applying the
    /// success / retry / dead-letter transition.
    ///
    /// Guarded on `(id, worker_id, state = processing)`: a worker whose
    /// claim was reaped gets [`StoreError::StaleClaim`] instead of
    /// overwriting another worker's run.
    pub async fn record_outcome(
        &self,
        id: &JobId,
        worker_id: &WorkerId,
        outcome: &Outcome,
        now: DateTime<Utc>,
    ) -> Result<Job, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<JobRow> =
            sqlx::query_as(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?"))
                .bind(id.as_str())
                .fetch_optional(&mut *tx)
                .await?;
        let Some(row) = row else {
            return Err(StoreError::NotFound(id.to_string()));
        };
        let job = Job::try_from(row)?;
        if job.state != JobState::Processing || job.worker_id.as_ref() != Some(worker_id) {
            return Err(StoreError::StaleClaim {
                id: id.clone(),
                worker_id: worker_id.clone(),
            });
        }

        let attempts = job.attempts + 1;
        let (next_state, run_at) = if outcome.is_success() {
            (JobState::Completed, job.run_at)
        } else if attempts <= job.max_retries {
            let delay = self.backoff.delay(attempts);
            (
                JobState::FailedTransient,
                now + chrono::Duration::milliseconds(delay.as_millis() as i64),
            )
        } else {
            (JobState::Dead, job.run_at)
        };

        let (stdout_tail, stderr_tail) = match outcome {
            Outcome::Succeeded {
                stdout_tail,
                stderr_tail,
            }
            | Outcome::FailedNonZero {
                stdout_tail,
                stderr_tail,
                ..
            }
            | Outcome::TimedOut {
                stdout_tail,
                stderr_tail,
            } => (Some(stdout_tail.as_str()), Some(stderr_tail.as_str())),
            Outcome::SpawnFailed { message } => (None, Some(message.as_str())),
        };

        let updated = sqlx::query(
            r#"
UPDATE jobs SET
    state = ?,
    attempts = ?,
    run_at = ?,
    last_exit_code = ?,
    stdout_tail = ?,
    stderr_tail = ?,
    worker_id = NULL,
    claimed_at = NULL,
    updated_at = ?
WHERE id = ? AND worker_id = ? AND state = ?
            "#,
        )
        .bind(next_state.as_str())
        .bind(i64::from(attempts))
        .bind(datetime_to_epoch_ms(run_at))
        .bind(outcome.exit_code())
        .bind(stdout_tail)
        .bind(stderr_tail)
        .bind(datetime_to_epoch_ms(now))
        .bind(id.as_str())
        .bind(worker_id.as_str())
        .bind(JobState::Processing.as_str())
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() != 1 {
            return Err(StoreError::StaleClaim {
                id: id.clone(),
                worker_id: worker_id.clone(),
            });
        }

        let row: JobRow = sqlx::query_as(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?"))
            .bind(id.as_str())
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        let job = Job::try_from(row)?;
        tracing::info!(
            job_id = %job.id,
            worker_id = %worker_id,
            outcome = outcome.label(),
            attempts = job.attempts,
            state = %job.state,
            "recorded outcome"
        );
        Ok(job)
    }

    /// Move a dead job back to `pending` with a fresh retry budget.
    pub async fn requeue(&self, id: &JobId, now: DateTime<Utc>) -> Result<Job, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<JobRow> =
            sqlx::query_as(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?"))
                .bind(id.as_str())
                .fetch_optional(&mut *tx)
                .await?;
        let Some(row) = row else {
            return Err(StoreError::NotFound(id.to_string()));
        };
        let job = Job::try_from(row)?;
        if job.state != JobState::Dead {
            return Err(StoreError::NotDead {
                id: id.clone(),
                state: job.state,
            });
        }

        let row: JobRow = sqlx::query_as(&format!(
            r#"
UPDATE jobs SET
    state = ?,
    attempts = 0,
    run_at = ?,
    worker_id = NULL,
    claimed_at = NULL,
    updated_at = ?
WHERE id = ? AND state = ?
RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(JobState::Pending.as_str())
        .bind(datetime_to_epoch_ms(now))
        .bind(datetime_to_epoch_ms(now))
        .bind(id.as_str())
        .bind(JobState::Dead.as_str())
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!(job_id = %id, "requeued dead job");
        Job::try_from(row)
    }

    /// Fetch one job by exact id.
    pub async fn get(&self, id: &JobId) -> Result<Job, StoreError> {
        let row: Option<JobRow> =
            sqlx::query_as(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?"))
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await?;
        match row {
            Some(row) => Job::try_from(row),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    /// Resolve an exact id or unique id prefix.
    pub async fn resolve_id(&self, prefix: &str) -> Result<JobId, StoreError> {
        let exact: Option<String> = sqlx::query_scalar("SELECT id FROM jobs WHERE id = ?")
            .bind(prefix)
            .fetch_optional(&self.pool)
            .await?;
        if let Some(id) = exact {
            return Ok(JobId::new(id));
        }

        let matches: Vec<String> =
            sqlx::query_scalar("SELECT id FROM jobs WHERE id LIKE ? || '%' LIMIT 2")
                .bind(prefix)
                .fetch_all(&self.pool)
                .await?;
        match matches.len() {
            1 => Ok(JobId::new(matches.into_iter().next().unwrap_or_default())),
            0 => Err(StoreError::NotFound(prefix.to_string())),
            n => Err(StoreError::AmbiguousId {
                prefix: prefix.to_string(),
                count: n,
            }),
        }
    }

    /// List jobs, newest first.
    pub async fn list(&self, filter: &JobFilter) -> Result<Vec<Job>, StoreError> {
        let mut builder =
            QueryBuilder::<Sqlite>::new(format!("SELECT {JOB_COLUMNS} FROM jobs"));
        if let Some(state) = filter.state {
            builder.push(" WHERE state = ");
            builder.push_bind(state.as_str());
        }
        builder.push(" ORDER BY seq DESC");
        if let Some(limit) = filter.limit {
            builder.push(" LIMIT ");
            builder.push_bind(limit as i64);
        }

        let rows: Vec<JobRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(Job::try_from).collect()
    }

    /// Per-state tallies across the whole table.
    pub async fn counts(&self) -> Result<StateCounts, StoreError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT state, COUNT(*) FROM jobs GROUP BY state")
                .fetch_all(&self.pool)
                .await?;

        let mut counts = StateCounts::default();
        for (state, count) in rows {
            let count = count.max(0) as u64;
            match state.parse::<JobState>() {
                Ok(JobState::Pending) => counts.pending = count,
                Ok(JobState::Processing) => counts.processing = count,
                Ok(JobState::Completed) => counts.completed = count,
                Ok(JobState::FailedTransient) => counts.failed_transient = count,
                Ok(JobState::Dead) => counts.dead = count,
                Err(e) => tracing::warn!(state, error = %e, "unknown state in counts"),
            }
        }
        Ok(counts)
    }

    /// Recover `processing` rows whose claim is older than `threshold`.
    ///
    /// Each orphan is pushed through the retryable-failure path as if its
    /// attempt had failed to spawn. The per-row update is keyed on the stale
    /// `(worker_id, claimed_at)` pair so a still-live worker that finishes
    /// in the meantime wins the race.
    pub async fn reap_orphans(
        &self,
        threshold: Duration,
        now: DateTime<Utc>,
    ) -> Result<Vec<JobId>, StoreError> {
        let cutoff = now - chrono::Duration::milliseconds(threshold.as_millis() as i64);
        let rows: Vec<JobRow> = sqlx::query_as(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE state = ? AND claimed_at <= ?"
        ))
        .bind(JobState::Processing.as_str())
        .bind(datetime_to_epoch_ms(cutoff))
        .fetch_all(&self.pool)
        .await?;

        let mut reaped = Vec::new();
        for row in rows {
            let job = Job::try_from(row)?;
            let (Some(worker_id), Some(claimed_at)) = (&job.worker_id, job.claimed_at) else {
                tracing::warn!(job_id = %job.id, "processing row without claim fields");
                continue;
            };

            let attempts = job.attempts + 1;
            let (next_state, run_at) = if attempts <= job.max_retries {
                let delay = self.backoff.delay(attempts);
                (
                    JobState::FailedTransient,
                    now + chrono::Duration::milliseconds(delay.as_millis() as i64),
                )
            } else {
                (JobState::Dead, job.run_at)
            };

            let updated = sqlx::query(
                r#"
UPDATE jobs SET
    state = ?,
    attempts = ?,
    run_at = ?,
    last_exit_code = NULL,
    stderr_tail = ?,
    worker_id = NULL,
    claimed_at = NULL,
    updated_at = ?
WHERE id = ? AND state = ? AND worker_id = ? AND claimed_at = ?
                "#,
            )
            .bind(next_state.as_str())
            .bind(i64::from(attempts))
            .bind(datetime_to_epoch_ms(run_at))
            .bind(format!("worker {worker_id} lost (claim expired)"))
            .bind(datetime_to_epoch_ms(now))
            .bind(job.id.as_str())
            .bind(JobState::Processing.as_str())
            .bind(worker_id.as_str())
            .bind(datetime_to_epoch_ms(claimed_at))
            .execute(&self.pool)
            .await?;

            if updated.rows_affected() == 1 {
                tracing::warn!(
                    job_id = %job.id,
                    worker_id = %worker_id,
                    attempts,
                    state = %next_state,
                    "reaped orphaned job"
                );
                reaped.push(job.id);
            }
        }
        Ok(reaped)
    }
}

async fn connect(path: &Path, create_if_missing: bool) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create_if_missing)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(BUSY_TIMEOUT);
    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await?;
    Ok(pool)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
