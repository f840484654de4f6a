// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    first_retry = { 1, 2 },
    second_retry = { 2, 4 },
    third_retry = { 3, 8 },
    tenth_retry = { 10, 1024 },
)]
fn default_policy_doubles(attempts: u32, expected_secs: u64) {
    let policy = BackoffPolicy::default();
    assert_eq!(policy.delay(attempts), Duration::from_secs(expected_secs));
}

#[test]
fn delay_is_capped() {
    let policy = BackoffPolicy::default();
    // 2^12 = 4096s > 1h cap
    assert_eq!(policy.delay(12), DEFAULT_BACKOFF_CAP);
    assert_eq!(policy.delay(u32::MAX), DEFAULT_BACKOFF_CAP);
}

#[test]
fn delay_is_monotonic_below_cap() {
    let policy = BackoffPolicy::new(1.5, Duration::from_secs(600)).unwrap();
    let mut last = Duration::ZERO;
    for attempts in 1..=20 {
        let d = policy.delay(attempts);
        assert!(d >= last, "delay({attempts}) shrank");
        last = d;
    }
}

#[test]
fn fractional_base_allows_fast_tests() {
    let policy = BackoffPolicy::new(0.5, DEFAULT_BACKOFF_CAP).unwrap();
    assert_eq!(policy.delay(1), Duration::from_millis(500));
    assert_eq!(policy.delay(2), Duration::from_millis(250));
}

#[parameterized(
    zero = { 0.0 },
    negative = { -2.0 },
    nan = { f64::NAN },
    infinite = { f64::INFINITY },
)]
fn invalid_bases_are_rejected(base: f64) {
    assert!(BackoffPolicy::new(base, DEFAULT_BACKOFF_CAP).is_err());
}
