// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schema creation and versioning.
//!
//! The schema version lives in a single-row `schema_meta` table. Opening a
//! database written by a newer build fails instead of downgrading; `initdb`
//! applies any pending migrations in order and is idempotent.

use crate::StoreError;
use sqlx::SqlitePool;

/// Highest schema version this build understands.
pub(crate) const SCHEMA_VERSION: i64 = 1;

/// Ordered migration ladder. Each entry brings the schema up to its version.
const MIGRATIONS: &[(i64, &str)] = &[(
    1,
    r#"
CREATE TABLE jobs (
    seq            INTEGER PRIMARY KEY AUTOINCREMENT,
    id             TEXT NOT NULL UNIQUE,
    command        TEXT NOT NULL,
    state          TEXT NOT NULL,
    priority       INTEGER NOT NULL DEFAULT 0,
    max_retries    INTEGER NOT NULL DEFAULT 3,
    attempts       INTEGER NOT NULL DEFAULT 0,
    run_at         INTEGER NOT NULL,
    created_at     INTEGER NOT NULL,
    updated_at     INTEGER NOT NULL,
    last_exit_code INTEGER,
    stdout_tail    TEXT,
    stderr_tail    TEXT,
    worker_id      TEXT,
    claimed_at     INTEGER
);
CREATE INDEX idx_jobs_ready ON jobs (state, run_at, priority);
CREATE INDEX idx_jobs_claimed ON jobs (state, claimed_at);
    "#,
)];

/// Create the version table if needed and apply pending migrations.
pub(crate) async fn ensure_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS schema_meta (
    id      INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL
)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("INSERT INTO schema_meta (id, version) VALUES (1, 0) ON CONFLICT(id) DO NOTHING")
        .execute(pool)
        .await?;

    let current = read_version(pool).await?;
    if current > SCHEMA_VERSION {
        return Err(StoreError::SchemaTooNew {
            found: current,
            supported: SCHEMA_VERSION,
        });
    }

    for (version, sql) in MIGRATIONS.iter().copied() {
        if version <= current {
            continue;
        }
        let mut tx = pool.begin().await?;
        sqlx::raw_sql(sql).execute(&mut *tx).await?;
        sqlx::query("UPDATE schema_meta SET version = ? WHERE id = 1")
            .bind(version)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::info!(version, "applied schema migration");
    }

    Ok(())
}

/// Verify an already-initialized database without mutating it.
///
/// Returns the error the caller should surface when the schema table is
/// missing (`uninitialized` supplies that variant) or the version is
/// out of range for this build.
pub(crate) async fn check_schema(
    pool: &SqlitePool,
    uninitialized: impl FnOnce() -> StoreError,
) -> Result<(), StoreError> {
    let meta_exists = sqlx::query_scalar::<_, String>(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'schema_meta'",
    )
    .fetch_optional(pool)
    .await?;
    if meta_exists.is_none() {
        return Err(uninitialized());
    }

    let version = read_version(pool).await?;
    if version > SCHEMA_VERSION {
        return Err(StoreError::SchemaTooNew {
            found: version,
            supported: SCHEMA_VERSION,
        });
    }
    if version < SCHEMA_VERSION {
        return Err(uninitialized());
    }
    Ok(())
}

async fn read_version(pool: &SqlitePool) -> Result<i64, StoreError> {
    let version = sqlx::query_scalar::<_, i64>("SELECT version FROM schema_meta WHERE id = 1")
        .fetch_one(pool)
        .await?;
    Ok(version)
}
