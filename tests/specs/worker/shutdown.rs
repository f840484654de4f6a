//! Cooperative shutdown specs.

use crate::prelude::*;
use serial_test::serial;
use std::time::Duration;

#[test]
#[serial]
fn sigterm_drains_the_current_job() {
    let queue = TestQueue::new();
    let id = queue.add("sleep 1", &[]);

    let worker = queue.spawn_worker(&["--poll-interval", "0.05"]);
    queue.wait_for_state(&id, "processing");
    worker.terminate();
    let status = worker.wait_with_timeout(Duration::from_secs(15));

    assert!(status.success(), "drained shutdown should exit 0");
    let job = queue.show_json(&id);
    assert_eq!(job["state"], "completed", "in-flight job must finish");
    assert_eq!(job["last_exit_code"], 0);
}

#[test]
#[serial]
fn worker_pool_fails_fast_without_initdb() {
    let queue = TestQueue::uninitialized();
    let out = queue.run(&["worker", "--poll-interval", "0.05"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("initdb"), "stderr: {stderr}");
}

#[test]
#[serial]
fn shutdown_leaves_pending_jobs_untouched() {
    let queue = TestQueue::new();
    let running = queue.add("sleep 1", &[]);
    let queued = queue.add("true", &["--priority", "-1"]);

    let worker = queue.spawn_worker(&["--poll-interval", "0.05"]);
    queue.wait_for_state(&running, "processing");
    worker.terminate();
    worker.wait_with_timeout(Duration::from_secs(15));

    // The worker drained its current job but claimed nothing new.
    assert_eq!(queue.show_json(&running)["state"], "completed");
    assert_eq!(queue.show_json(&queued)["state"], "pending");
}
