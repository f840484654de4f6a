// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn reap_threshold_has_a_floor() {
    assert_eq!(
        reap_threshold(None, Duration::from_secs(30)),
        MIN_REAP_THRESHOLD
    );
    assert_eq!(
        reap_threshold(Some(Duration::from_secs(10)), Duration::from_secs(5)),
        MIN_REAP_THRESHOLD
    );
}

#[test]
fn reap_threshold_scales_with_timeout_and_grace() {
    let threshold = reap_threshold(Some(Duration::from_secs(600)), Duration::from_secs(30));
    assert_eq!(threshold, Duration::from_secs(660));
}

#[test]
fn supervisor_config_derives_reap_threshold() {
    let mut config = SupervisorConfig::new("queue.db".into());
    assert_eq!(config.reap_threshold(), MIN_REAP_THRESHOLD);

    config.reap_after = Some(Duration::from_secs(10));
    assert_eq!(config.reap_threshold(), Duration::from_secs(10));
}
