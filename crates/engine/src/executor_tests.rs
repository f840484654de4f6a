// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Instant;

#[tokio::test]
async fn success_captures_stdout() {
    let outcome = ShellExecutor::new().execute("echo hello", None).await;
    match outcome {
        Outcome::Succeeded { stdout_tail, .. } => assert_eq!(stdout_tail, "hello\n"),
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn nonzero_exit_is_reported() {
    let outcome = ShellExecutor::new().execute("exit 3", None).await;
    assert_eq!(outcome.exit_code(), Some(3));
    assert!(!outcome.is_success());
}

#[tokio::test]
async fn stderr_is_captured_separately() {
    let outcome = ShellExecutor::new()
        .execute("echo out; echo oops >&2; exit 1", None)
        .await;
    match outcome {
        Outcome::FailedNonZero {
            exit_code,
            stdout_tail,
            stderr_tail,
        } => {
            assert_eq!(exit_code, 1);
            assert_eq!(stdout_tail, "out\n");
            assert_eq!(stderr_tail, "oops\n");
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_command_fails_through_shell() {
    let outcome = ShellExecutor::new()
        .execute("definitely-not-a-real-command-xyz", None)
        .await;
    // The shell itself reports 127; spawn succeeded.
    assert_eq!(outcome.exit_code(), Some(127));
}

#[tokio::test]
async fn timeout_kills_the_child() {
    let executor = ShellExecutor::new().with_kill_grace(Duration::from_millis(200));
    let start = Instant::now();
    let outcome = executor
        .execute("sleep 30", Some(Duration::from_millis(100)))
        .await;
    assert!(matches!(outcome, Outcome::TimedOut { .. }));
    assert!(
        start.elapsed() < Duration::from_secs(5),
        "escalation must not wait for the child's natural exit"
    );
}

#[tokio::test]
async fn timeout_preserves_partial_output() {
    let executor = ShellExecutor::new().with_kill_grace(Duration::from_millis(200));
    let outcome = executor
        .execute("echo started; sleep 30", Some(Duration::from_millis(300)))
        .await;
    match outcome {
        Outcome::TimedOut { stdout_tail, .. } => assert_eq!(stdout_tail, "started\n"),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn output_is_tail_bounded() {
    let executor = ShellExecutor::new().with_tail_limit(100);
    let outcome = executor
        .execute("seq 1 1000", None)
        .await;
    match outcome {
        Outcome::Succeeded { stdout_tail, .. } => {
            assert_eq!(stdout_tail.len(), 100);
            assert!(stdout_tail.ends_with("1000\n"));
        }
        other => panic!("expected success, got {other:?}"),
    }
}
