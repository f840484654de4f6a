// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a worker process within a supervisor run.
///
/// The supervisor mints one per pool slot; the store records it on every
/// claim so a stale lease can be attributed to the worker that held it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(String);

impl WorkerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identity for a supervisor pool slot: `worker-<slot>-<nonce>`.
    /// The nonce keeps restarted slots distinguishable in logs and in
    /// reaped-claim attributions.
    pub fn for_slot(slot: u32) -> Self {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("worker-{slot}-{}", nonce.get(..8).unwrap_or(&nonce)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
