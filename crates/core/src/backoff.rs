// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry backoff policy.

use std::time::Duration;

/// Default exponent base for retry delays.
pub const DEFAULT_BACKOFF_BASE: f64 = 2.0;

/// Default cap on any single retry delay.
pub const DEFAULT_BACKOFF_CAP: Duration = Duration::from_secs(3600);

/// Error constructing a backoff policy.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("backoff base must be a positive finite number, got {0}")]
pub struct BackoffError(pub f64);

/// Pure exponential backoff: `delay(attempts) = base^attempts` seconds,
/// capped.
///
/// `attempts` is the post-increment value, so the first retry waits
/// `base^1` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    base: f64,
    cap: Duration,
}

impl BackoffPolicy {
    pub fn new(base: f64, cap: Duration) -> Result<Self, BackoffError> {
        if !base.is_finite() || base <= 0.0 {
            return Err(BackoffError(base));
        }
        Ok(Self { base, cap })
    }

    pub fn base(&self) -> f64 {
        self.base
    }

    /// Delay before the retry following the given (post-increment) attempt
    /// count.
    pub fn delay(&self, attempts: u32) -> Duration {
        let secs = self.base.powi(attempts.min(i32::MAX as u32) as i32);
        if !secs.is_finite() || secs >= self.cap.as_secs_f64() {
            return self.cap;
        }
        Duration::from_secs_f64(secs)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: DEFAULT_BACKOFF_BASE,
            cap: DEFAULT_BACKOFF_CAP,
        }
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
