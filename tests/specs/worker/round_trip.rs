//! End-to-end success path: enqueue, execute, complete.

use crate::prelude::*;
use serial_test::serial;
use std::time::Duration;

#[test]
#[serial]
fn true_command_completes_once() {
    let queue = TestQueue::new();
    let id = queue.add("true", &[]);

    let worker = queue.spawn_worker(&["--poll-interval", "0.05"]);
    let job = queue.wait_for_state(&id, "completed");
    assert_eq!(job["last_exit_code"], 0);
    assert_eq!(job["attempts"], 1);
    assert!(job["worker_id"].is_null());

    worker.terminate();
    let status = worker.wait_with_timeout(Duration::from_secs(10));
    assert!(status.success(), "graceful shutdown should exit 0");
}

#[test]
#[serial]
fn output_tails_are_recorded() {
    let queue = TestQueue::new();
    let id = queue.add("echo to-stdout; echo to-stderr >&2", &[]);

    let worker = queue.spawn_worker(&["--poll-interval", "0.05"]);
    let job = queue.wait_for_state(&id, "completed");
    assert_eq!(job["stdout_tail"], "to-stdout\n");
    assert_eq!(job["stderr_tail"], "to-stderr\n");
    drop(worker);
}

#[test]
#[serial]
fn pool_completes_each_job_exactly_once() {
    let queue = TestQueue::new();
    let ids: Vec<String> = (0..20).map(|_| queue.add("true", &[])).collect();

    let worker = queue.spawn_worker(&["-n", "4", "--poll-interval", "0.05"]);
    for id in &ids {
        let job = queue.wait_for_state(id, "completed");
        assert_eq!(job["attempts"], 1, "job {id} must run exactly once");
    }
    drop(worker);
}
