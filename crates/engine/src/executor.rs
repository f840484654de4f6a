// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Child-process execution under timeout.

use crate::process;
use crate::tail::{TailBuffer, DEFAULT_TAIL_LIMIT};
use async_trait::async_trait;
use queuectl_core::Outcome;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

/// Window between polite SIGTERM and forceful SIGKILL on timeout.
pub const DEFAULT_KILL_GRACE: Duration = Duration::from_secs(5);

/// Runs one command and reports what happened.
///
/// Implemented by [`ShellExecutor`] in production; tests inject scripted
/// implementations to drive the retry machinery deterministically.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, command: &str, timeout: Option<Duration>) -> Outcome;
}

/// Executes a command line via `sh -c` in its own process group.
///
/// The command string is handed to the shell verbatim; queuectl does not
/// parse or sandbox it. Stdout and stderr are captured as bounded tails.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    kill_grace: Duration,
    tail_limit: usize,
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self {
            kill_grace: DEFAULT_KILL_GRACE,
            tail_limit: DEFAULT_TAIL_LIMIT,
        }
    }

    pub fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }

    pub fn with_tail_limit(mut self, limit: usize) -> Self {
        self.tail_limit = limit;
        self
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

enum Waited {
    Exited(ExitStatus),
    TimedOut,
}

#[async_trait]
impl Executor for ShellExecutor {
    async fn execute(&self, command: &str, timeout: Option<Duration>) -> Outcome {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match process::spawn_in_group(&mut cmd) {
            Ok(child) => child,
            Err(e) => {
                return Outcome::SpawnFailed {
                    message: e.to_string(),
                }
            }
        };

        let stdout_task = spawn_tail_reader(child.stdout.take(), self.tail_limit);
        let stderr_task = spawn_tail_reader(child.stderr.take(), self.tail_limit);

        let waited = match timeout {
            None => child.wait().await.map(Waited::Exited),
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(result) => result.map(Waited::Exited),
                Err(_elapsed) => {
                    // Polite termination first, then force after the grace
                    // window. Signals target the whole group so pipeline
                    // members and grandchildren go down too.
                    if let Some(pid) = child.id() {
                        let _ = process::terminate_group(pid);
                    }
                    if tokio::time::timeout(self.kill_grace, child.wait())
                        .await
                        .is_err()
                    {
                        if let Some(pid) = child.id() {
                            let _ = process::kill_group(pid);
                        }
                        let _ = child.wait().await;
                    }
                    Ok(Waited::TimedOut)
                }
            },
        };

        let stdout_tail = stdout_task.await.unwrap_or_default();
        let stderr_tail = stderr_task.await.unwrap_or_default();

        match waited {
            Err(e) => Outcome::SpawnFailed {
                message: format!("wait failed: {e}"),
            },
            Ok(Waited::TimedOut) => Outcome::TimedOut {
                stdout_tail,
                stderr_tail,
            },
            Ok(Waited::Exited(status)) => match exit_code_of(status) {
                0 => Outcome::Succeeded {
                    stdout_tail,
                    stderr_tail,
                },
                code => Outcome::FailedNonZero {
                    exit_code: code,
                    stdout_tail,
                    stderr_tail,
                },
            },
        }
    }
}

/// Numeric exit code, mapping signal deaths to `128 + signo` the way
/// shells report them.
fn exit_code_of(status: ExitStatus) -> i64 {
    if let Some(code) = status.code() {
        return i64::from(code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + i64::from(signal);
        }
    }
    -1
}

fn spawn_tail_reader<R>(stream: Option<R>, limit: usize) -> JoinHandle<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let Some(mut stream) = stream else {
            return String::new();
        };
        let mut tail = TailBuffer::new(limit);
        let mut chunk = vec![0u8; 8192];
        loop {
            match stream.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => tail.push(&chunk[..n]),
                Err(_) => break,
            }
        }
        tail.into_string()
    })
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
