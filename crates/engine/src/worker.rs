// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single worker loop: claim, execute, record.

use crate::config::{WorkerConfig, REAP_EVERY_POLLS};
use crate::executor::Executor;
use queuectl_core::{Clock, Job};
use queuectl_storage::{Store, StoreError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

/// Consecutive store failures tolerated before the worker gives up.
const STORE_RETRY_LIMIT: u32 = 5;

/// Base delay for store-failure backoff (doubles per consecutive failure).
const STORE_RETRY_BASE: Duration = Duration::from_millis(250);

/// Terminal worker failures. Job-level problems never surface here; they
/// are recorded as outcomes and handled by the state machine.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("store unavailable after {attempts} consecutive failures: {source}")]
    StoreUnavailable {
        attempts: u32,
        #[source]
        source: StoreError,
    },
}

/// One worker: a stable identity, a store handle, and an executor.
///
/// The loop never retries jobs at its own level; retry is entirely a
/// store/state-machine decision.
pub struct Worker<E, C> {
    store: Store,
    executor: E,
    clock: C,
    config: WorkerConfig,
}

impl<E: Executor, C: Clock> Worker<E, C> {
    pub fn new(store: Store, executor: E, clock: C, config: WorkerConfig) -> Self {
        Self {
            store,
            executor,
            clock,
            config,
        }
    }

    /// Run until `shutdown` flips to true. A job already executing when
    /// shutdown arrives is drained to completion (or its timeout) first.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), WorkerError> {
        let worker_id = self.config.worker_id.clone();
        tracing::info!(worker_id = %worker_id, "worker started");

        // Sweep on the first poll so a restarted pool recovers orphans
        // promptly, then periodically.
        let mut polls_since_reap = REAP_EVERY_POLLS;
        let mut claim_failures: u32 = 0;

        loop {
            if *shutdown.borrow() {
                break;
            }

            if polls_since_reap >= REAP_EVERY_POLLS {
                polls_since_reap = 0;
                match self
                    .store
                    .reap_orphans(self.config.reap_threshold, self.clock.now())
                    .await
                {
                    Ok(reaped) if !reaped.is_empty() => {
                        tracing::info!(worker_id = %worker_id, count = reaped.len(), "reaped orphaned jobs");
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(worker_id = %worker_id, error = %e, "orphan sweep failed"),
                }
            }

            match self.store.claim_one(&worker_id, self.clock.now()).await {
                Ok(Some(job)) => {
                    claim_failures = 0;
                    self.run_job(&job).await;
                }
                Ok(None) => {
                    claim_failures = 0;
                    polls_since_reap += 1;
                    self.idle_sleep(&mut shutdown).await;
                }
                Err(e) => {
                    claim_failures += 1;
                    if claim_failures > STORE_RETRY_LIMIT {
                        tracing::error!(worker_id = %worker_id, error = %e, "store unavailable, giving up");
                        return Err(WorkerError::StoreUnavailable {
                            attempts: claim_failures,
                            source: e,
                        });
                    }
                    tracing::warn!(
                        worker_id = %worker_id,
                        attempt = claim_failures,
                        error = %e,
                        "claim failed, backing off"
                    );
                    let delay = STORE_RETRY_BASE * 2u32.pow(claim_failures - 1);
                    self.interruptible_sleep(delay, &mut shutdown).await;
                }
            }
        }

        tracing::info!(worker_id = %worker_id, "worker stopped");
        Ok(())
    }

    async fn run_job(&self, job: &Job) {
        let worker_id = &self.config.worker_id;
        tracing::info!(
            worker_id = %worker_id,
            job_id = %job.id,
            attempts = job.attempts,
            command = %job.command,
            "executing job"
        );

        let outcome = self
            .executor
            .execute(&job.command, self.config.timeout)
            .await;

        // Bounded retry on transient store failures. If the record is
        // ultimately lost the claim stays `processing` and the reaper
        // recovers it; abandoning here is safe, just slower.
        let mut attempt: u32 = 0;
        loop {
            match self
                .store
                .record_outcome(&job.id, worker_id, &outcome, self.clock.now())
                .await
            {
                Ok(_) => break,
                Err(e) if e.is_transient() && attempt < STORE_RETRY_LIMIT => {
                    attempt += 1;
                    tracing::warn!(
                        job_id = %job.id,
                        attempt,
                        error = %e,
                        "recording outcome failed, retrying"
                    );
                    tokio::time::sleep(STORE_RETRY_BASE * 2u32.pow(attempt - 1)).await;
                }
                Err(e) => {
                    tracing::error!(
                        job_id = %job.id,
                        error = %e,
                        "abandoning outcome record; reaper will recover the claim"
                    );
                    break;
                }
            }
        }
    }

    async fn idle_sleep(&self, shutdown: &mut watch::Receiver<bool>) {
        let poll = self.config.poll_interval;
        let jitter_cap = (poll.as_millis() as u64 / 4).max(1);
        let delay = poll + Duration::from_millis(fastrand::u64(0..jitter_cap));
        self.interruptible_sleep(delay, shutdown).await;
    }

    async fn interruptible_sleep(&self, delay: Duration, shutdown: &mut watch::Receiver<bool>) {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = wait_for_shutdown(shutdown) => {}
        }
    }
}

/// Resolves when the shutdown flag flips; never resolves if the sender is
/// gone (the sleep arm then bounds the wait).
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
        if *shutdown.borrow() {
            return;
        }
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
