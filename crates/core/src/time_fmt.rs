// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timestamp parsing and compact elapsed-time formatting.

use chrono::{DateTime, Utc};

/// Error for a timestamp the CLI cannot accept.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timestamp '{input}': {reason}")]
pub struct TimestampError {
    pub input: String,
    pub reason: String,
}

/// Parse an RFC 3339 / ISO-8601 timestamp with an explicit UTC offset.
///
/// Naive timestamps (no offset) are rejected rather than guessed at.
pub fn parse_rfc3339_utc(input: &str) -> Result<DateTime<Utc>, TimestampError> {
    DateTime::parse_from_rfc3339(input)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| TimestampError {
            input: input.to_string(),
            reason: format!("{e} (an explicit offset such as 'Z' or '+02:00' is required)"),
        })
}

/// Compact "how long ago" formatting for list views: `3s`, `5m`, `2h15m`,
/// `3d`. Instants in the future render with a leading `in `.
pub fn format_age(from: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let (elapsed, future) = if from <= now {
        (now - from, false)
    } else {
        (from - now, true)
    };

    let secs = elapsed.num_seconds();
    let formatted = if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86_400 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        if mins == 0 {
            format!("{}h", hours)
        } else {
            format!("{}h{}m", hours, mins)
        }
    } else {
        format!("{}d", secs / 86_400)
    };

    if future {
        format!("in {}", formatted)
    } else {
        formatted
    }
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
