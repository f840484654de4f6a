//! Enqueue / list / show contract specs.

use crate::prelude::*;

#[test]
fn initdb_is_idempotent() {
    let queue = TestQueue::new();
    let out = queue.run_ok(&["initdb"]);
    assert!(out.contains("Initialized"));
    // Rows survive a second initdb.
    let id = queue.add("echo hi", &[]);
    queue.run_ok(&["initdb"]);
    assert_eq!(queue.show_json(&id)["command"], "echo hi");
}

#[test]
fn add_prints_id_and_show_round_trips() {
    let queue = TestQueue::new();
    let id = queue.add("echo hello", &["--priority", "4", "--max-retries", "1"]);
    assert!(!id.is_empty());

    let job = queue.show_json(&id);
    assert_eq!(job["id"], id.as_str());
    assert_eq!(job["state"], "pending");
    assert_eq!(job["command"], "echo hello");
    assert_eq!(job["priority"], 4);
    assert_eq!(job["max_retries"], 1);
    assert_eq!(job["attempts"], 0);
    assert!(job["worker_id"].is_null());
}

#[test]
fn add_accepts_future_run_at() {
    let queue = TestQueue::new();
    let id = queue.add("true", &["--run-at", "2030-01-01T00:00:00Z"]);
    let job = queue.show_json(&id);
    assert_eq!(job["state"], "pending");
    assert!(job["run_at"].as_str().unwrap().starts_with("2030-01-01"));
}

#[test]
fn show_accepts_unique_prefix() {
    let queue = TestQueue::new();
    let id = queue.add("true", &[]);
    let job = queue.show_json(&id[..8]);
    assert_eq!(job["id"], id.as_str());
}

#[test]
fn list_renders_table_and_footer() {
    let queue = TestQueue::new();
    let id = queue.add("echo table-test", &[]);
    let out = queue.run_ok(&["list"]);
    assert!(out.contains("ID"));
    assert!(out.contains(&id[..8]));
    assert!(out.contains("echo table-test"));
    assert!(out.contains("1 pending"));
}

#[test]
fn list_json_is_machine_readable() {
    let queue = TestQueue::new();
    queue.add("a", &[]);
    queue.add("b", &[]);
    let out = queue.run_ok(&["list", "-o", "json"]);
    let jobs: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(jobs.as_array().unwrap().len(), 2);
}

#[test]
fn empty_dlq_lists_nothing() {
    let queue = TestQueue::new();
    queue.add("true", &[]);
    let out = queue.run_ok(&["list", "--dlq"]);
    assert!(out.contains("No jobs"));
}
