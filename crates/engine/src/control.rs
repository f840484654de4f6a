// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control surface consumed by the CLI: enqueue, inspect, list, requeue.

use queuectl_core::{BackoffPolicy, Clock, Job, JobId, NewJob};
use queuectl_storage::{JobFilter, StateCounts, Store, StoreError};
use std::path::Path;

/// Create (or upgrade) the queue database schema. Idempotent.
pub async fn init_store(path: &Path) -> Result<Store, StoreError> {
    Store::create(path, BackoffPolicy::default()).await
}

/// Queue operations over an open store.
///
/// Accepts id prefixes wherever a job id is expected, as long as the
/// prefix is unambiguous.
pub struct Control<C> {
    store: Store,
    clock: C,
}

impl<C: Clock> Control<C> {
    pub fn new(store: Store, clock: C) -> Self {
        Self { store, clock }
    }

    pub async fn enqueue(&self, new: NewJob) -> Result<Job, StoreError> {
        self.store
            .enqueue(JobId::generate(), new, self.clock.now())
            .await
    }

    pub async fn get(&self, id_or_prefix: &str) -> Result<Job, StoreError> {
        let id = self.store.resolve_id(id_or_prefix).await?;
        self.store.get(&id).await
    }

    pub async fn list(&self, filter: &JobFilter) -> Result<Vec<Job>, StoreError> {
        self.store.list(filter).await
    }

    pub async fn counts(&self) -> Result<StateCounts, StoreError> {
        self.store.counts().await
    }

    pub async fn requeue(&self, id_or_prefix: &str) -> Result<Job, StoreError> {
        let id = self.store.resolve_id(id_or_prefix).await?;
        self.store.requeue(&id, self.clock.now()).await
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
