// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use queuectl_core::JobState;

fn row() -> JobRow {
    JobRow {
        id: "j-1".into(),
        command: "true".into(),
        state: "pending".into(),
        priority: 0,
        max_retries: 3,
        attempts: 0,
        run_at: 1_767_225_600_000,
        created_at: 1_767_225_600_000,
        updated_at: 1_767_225_600_000,
        last_exit_code: None,
        stdout_tail: None,
        stderr_tail: None,
        worker_id: None,
        claimed_at: None,
    }
}

#[test]
fn row_maps_to_job() {
    let job = Job::try_from(row()).unwrap();
    assert_eq!(job.id.as_str(), "j-1");
    assert_eq!(job.state, JobState::Pending);
    assert_eq!(job.run_at.timestamp_millis(), 1_767_225_600_000);
    assert!(job.worker_id.is_none());
}

#[test]
fn row_with_claim_fields() {
    let mut raw = row();
    raw.state = "processing".into();
    raw.worker_id = Some("w-1".into());
    raw.claimed_at = Some(1_767_225_660_000);
    let job = Job::try_from(raw).unwrap();
    assert_eq!(job.state, JobState::Processing);
    assert_eq!(job.worker_id.map(|w| w.to_string()), Some("w-1".into()));
    assert_eq!(
        job.claimed_at.map(|t| t.timestamp_millis()),
        Some(1_767_225_660_000)
    );
}

#[test]
fn unknown_state_is_corrupt() {
    let mut raw = row();
    raw.state = "zombie".into();
    let err = Job::try_from(raw).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { .. }));
}

#[test]
fn negative_attempts_is_corrupt() {
    let mut raw = row();
    raw.attempts = -1;
    assert!(matches!(
        Job::try_from(raw).unwrap_err(),
        StoreError::Corrupt { .. }
    ));
}

#[test]
fn epoch_ms_round_trips() {
    let t = epoch_ms_to_datetime(1_767_225_600_123).unwrap();
    assert_eq!(datetime_to_epoch_ms(t), 1_767_225_600_123);
}
