//! Test helpers for behavioral specifications.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Upper bound for any polled condition.
pub const WAIT_MAX: Duration = Duration::from_secs(15);

/// Poll cadence for state waits.
pub const POLL: Duration = Duration::from_millis(25);

fn queuectl_binary() -> PathBuf {
    assert_cmd::cargo::cargo_bin("queuectl")
}

/// An isolated queue database plus CLI wiring for one spec.
pub struct TestQueue {
    dir: TempDir,
}

impl TestQueue {
    /// Temp directory with an initialized queue database.
    pub fn new() -> Self {
        let queue = Self::uninitialized();
        queue.run_ok(&["initdb"]);
        queue
    }

    /// Temp directory without running `initdb`.
    pub fn uninitialized() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("queue.db")
    }

    /// Build a queuectl command pointed at this spec's database.
    pub fn cmd(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(queuectl_binary());
        cmd.arg("--db").arg(self.db_path());
        cmd.args(args);
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.cmd(args).output().unwrap()
    }

    /// Run and assert success; returns stdout.
    pub fn run_ok(&self, args: &[&str]) -> String {
        let out = self.run(args);
        assert!(
            out.status.success(),
            "command {:?} failed ({:?})\nstdout: {}\nstderr: {}",
            args,
            out.status.code(),
            String::from_utf8_lossy(&out.stdout),
            String::from_utf8_lossy(&out.stderr),
        );
        String::from_utf8_lossy(&out.stdout).into_owned()
    }

    /// Enqueue a command, returning the printed job id.
    pub fn add(&self, command: &str, extra: &[&str]) -> String {
        let mut args = vec!["add", command];
        args.extend_from_slice(extra);
        self.run_ok(&args).trim().to_string()
    }

    pub fn show_json(&self, id: &str) -> serde_json::Value {
        let out = self.run_ok(&["show", id, "-o", "json"]);
        serde_json::from_str(&out).unwrap()
    }

    /// Start a worker pool as a real child process.
    pub fn spawn_worker(&self, extra: &[&str]) -> WorkerHandle {
        let mut cmd = self.cmd(&["worker"]);
        cmd.args(extra);
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
        WorkerHandle {
            child: cmd.spawn().unwrap(),
        }
    }

    /// Poll `show` until the job reaches `state`; returns the job JSON.
    pub fn wait_for_state(&self, id: &str, state: &str) -> serde_json::Value {
        let deadline = Instant::now() + WAIT_MAX;
        loop {
            let job = self.show_json(id);
            if job["state"] == state {
                return job;
            }
            assert!(
                Instant::now() < deadline,
                "timed out waiting for state '{state}'; job = {job}"
            );
            std::thread::sleep(POLL);
        }
    }
}

/// Running worker pool; killed on drop so failed specs don't leak
/// processes.
pub struct WorkerHandle {
    child: Child,
}

impl WorkerHandle {
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Send SIGTERM to the supervisor.
    pub fn terminate(&self) {
        let _ = Command::new("kill")
            .arg("-TERM")
            .arg(self.pid().to_string())
            .status();
    }

    /// Wait for exit, bounded.
    pub fn wait_with_timeout(mut self, timeout: Duration) -> ExitStatus {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = self.child.try_wait().unwrap() {
                return status;
            }
            assert!(Instant::now() < deadline, "worker pool did not exit in time");
            std::thread::sleep(POLL);
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        if matches!(self.child.try_wait(), Ok(Some(_))) {
            return;
        }
        // Graceful first: SIGKILL on the supervisor would orphan its
        // worker child processes.
        let _ = Command::new("kill")
            .arg("-TERM")
            .arg(self.child.id().to_string())
            .status();
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            if matches!(self.child.try_wait(), Ok(Some(_))) {
                return;
            }
            std::thread::sleep(POLL);
        }
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
