//! Retry exhaustion and dead-letter handling.

use crate::prelude::*;
use serial_test::serial;

#[test]
#[serial]
fn failing_job_exhausts_to_dlq() {
    let queue = TestQueue::new();
    let id = queue.add("false", &["--max-retries", "1"]);

    // Tiny backoff base so both attempts happen within the wait window.
    let worker = queue.spawn_worker(&["--poll-interval", "0.05", "--backoff-base", "0.001"]);
    let job = queue.wait_for_state(&id, "dead");
    assert_eq!(job["attempts"], 2);
    assert_eq!(job["last_exit_code"], 1);
    drop(worker);

    let out = queue.run_ok(&["list", "--dlq"]);
    assert!(out.contains(&id[..8]));
}

#[test]
#[serial]
fn requeue_revives_a_dead_job() {
    let queue = TestQueue::new();
    let id = queue.add("false", &["--max-retries", "0"]);

    let worker = queue.spawn_worker(&["--poll-interval", "0.05"]);
    queue.wait_for_state(&id, "dead");
    worker.terminate();
    worker.wait_with_timeout(std::time::Duration::from_secs(10));

    let out = queue.run_ok(&["requeue", &id]);
    assert!(out.contains("Requeued"));
    let job = queue.show_json(&id);
    assert_eq!(job["state"], "pending");
    assert_eq!(job["attempts"], 0);
}

#[test]
#[serial]
fn timed_out_job_retries_then_dies() {
    let queue = TestQueue::new();
    let id = queue.add("sleep 30", &["--max-retries", "0"]);

    let worker = queue.spawn_worker(&[
        "--poll-interval",
        "0.05",
        "--timeout",
        "1",
    ]);
    let job = queue.wait_for_state(&id, "dead");
    assert_eq!(job["attempts"], 1);
    assert!(job["last_exit_code"].is_null());
    drop(worker);
}
