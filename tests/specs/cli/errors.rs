//! Error-path specs: exit codes and messages.

use crate::prelude::*;

#[test]
fn show_missing_id_exits_1() {
    let queue = TestQueue::new();
    let out = queue.run(&["show", "no-such-id"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("not found"), "stderr: {stderr}");
}

#[test]
fn requeue_non_dead_job_exits_1() {
    let queue = TestQueue::new();
    let id = queue.add("true", &[]);
    let out = queue.run(&["requeue", &id]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("only dead jobs"), "stderr: {stderr}");
}

#[test]
fn commands_require_initdb() {
    let queue = TestQueue::uninitialized();
    let out = queue.run(&["add", "true"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("initdb"), "stderr: {stderr}");
}

#[test]
fn naive_run_at_timestamp_is_rejected() {
    let queue = TestQueue::new();
    let out = queue.run(&["add", "true", "--run-at", "2026-03-01T12:00:00"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("offset"), "stderr: {stderr}");
}

#[test]
fn unknown_state_filter_is_rejected() {
    let queue = TestQueue::new();
    let out = queue.run(&["list", "--state", "zombie"]);
    assert!(!out.status.success());
}

#[test]
fn ambiguous_prefix_is_rejected() {
    let queue = TestQueue::new();
    queue.add("true", &[]);
    queue.add("true", &[]);
    // Every UUID here is distinct, but the empty prefix matches both.
    let out = queue.run(&["show", ""]);
    assert_eq!(out.status.code(), Some(1));
}
