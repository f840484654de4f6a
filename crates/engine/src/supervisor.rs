// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker pool supervision.
//!
//! Workers run as separate OS processes (re-invocations of the current
//! executable's hidden worker-child command) so a crashing job executor
//! takes down one worker, not the pool. Coordination happens entirely
//! through the store and process signals.

use crate::config::SupervisorConfig;
use crate::process;
use queuectl_core::WorkerId;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::{Child, Command};
use tokio::signal::unix::{signal, SignalKind};

/// Subcommand name the supervisor invokes on its own binary. The CLI must
/// expose a (hidden) subcommand under this name accepting the flags built
/// in [`Supervisor::spawn_worker`].
pub const WORKER_CHILD_SUBCOMMAND: &str = "worker-child";

/// Cadence for checking child liveness.
const CHILD_CHECK_INTERVAL: Duration = Duration::from_millis(250);

/// Window over which the restart budget applies.
const RESTART_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// How the pool came down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorOutcome {
    /// At least one worker had to be force-killed after the grace period.
    pub forced: bool,
    /// The pool shut down because workers kept crashing.
    pub crashed: bool,
}

impl SupervisorOutcome {
    pub fn is_graceful(&self) -> bool {
        !self.forced && !self.crashed
    }
}

struct WorkerChild {
    slot: u32,
    id: WorkerId,
    child: Child,
}

/// Spawns and babysits N worker processes until signalled.
pub struct Supervisor {
    config: SupervisorConfig,
}

impl Supervisor {
    pub fn new(config: SupervisorConfig) -> Self {
        Self { config }
    }

    /// Run until SIGINT/SIGTERM, then drain workers within the grace
    /// period and force-kill stragglers.
    pub async fn run(&self) -> Result<SupervisorOutcome, SupervisorError> {
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        let mut children = Vec::new();
        for slot in 0..self.config.workers {
            children.push(self.spawn_worker(slot)?);
        }
        tracing::info!(
            workers = children.len(),
            db = %self.config.db_path.display(),
            "supervisor started"
        );

        let mut restarts = RestartWindow::new(self.config.restart_budget);
        let mut check = tokio::time::interval(CHILD_CHECK_INTERVAL);
        let mut crashed = false;

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("received SIGTERM, draining workers");
                    break;
                }
                _ = sigint.recv() => {
                    tracing::info!("received SIGINT, draining workers");
                    break;
                }
                _ = check.tick() => {
                    self.reap_and_restart(&mut children, &mut restarts, &mut crashed)?;
                    if crashed || children.is_empty() {
                        crashed = true;
                        break;
                    }
                }
            }
        }

        let forced = self.drain(children).await;
        Ok(SupervisorOutcome { forced, crashed })
    }

    /// Collect exited children and restart them while the budget allows.
    fn reap_and_restart(
        &self,
        children: &mut Vec<WorkerChild>,
        restarts: &mut RestartWindow,
        crashed: &mut bool,
    ) -> Result<(), SupervisorError> {
        let mut i = 0;
        while i < children.len() {
            match children[i].child.try_wait()? {
                None => i += 1,
                Some(status) => {
                    let dead = children.swap_remove(i);
                    tracing::warn!(worker_id = %dead.id, %status, "worker exited unexpectedly");
                    if restarts.allow(Instant::now()) {
                        let replacement = self.spawn_worker(dead.slot)?;
                        tracing::info!(
                            worker_id = %replacement.id,
                            slot = dead.slot,
                            "restarted worker"
                        );
                        children.push(replacement);
                    } else {
                        tracing::error!("worker restart budget exhausted, shutting down pool");
                        *crashed = true;
                        return Ok(());
                    }
                }
            }
        }
        Ok(())
    }

    fn spawn_worker(&self, slot: u32) -> Result<WorkerChild, SupervisorError> {
        let exe = std::env::current_exe()?;
        let id = WorkerId::for_slot(slot);

        let mut cmd = Command::new(exe);
        cmd.arg(WORKER_CHILD_SUBCOMMAND)
            .arg("--db")
            .arg(&self.config.db_path)
            .arg("--worker-id")
            .arg(id.as_str())
            .arg("--poll-interval-ms")
            .arg(self.config.poll_interval.as_millis().to_string())
            .arg("--backoff-base")
            .arg(self.config.backoff_base.to_string())
            .arg("--reap-after-secs")
            .arg(self.config.reap_threshold().as_secs().to_string())
            .kill_on_drop(true);
        if let Some(timeout) = self.config.timeout {
            cmd.arg("--timeout-secs").arg(timeout.as_secs().to_string());
        }

        let child = cmd.spawn()?;
        tracing::info!(worker_id = %id, pid = child.id(), "spawned worker process");
        Ok(WorkerChild { slot, id, child })
    }

    /// Signal every child, grant the grace period, then force-kill.
    /// Returns true when force-killing was necessary.
    async fn drain(&self, mut children: Vec<WorkerChild>) -> bool {
        if children.is_empty() {
            return false;
        }

        for worker in &children {
            if let Some(pid) = worker.child.id() {
                let _ = process::terminate_pid(pid);
            }
        }

        let deadline = Instant::now() + self.config.grace;
        while Instant::now() < deadline {
            let mut i = 0;
            while i < children.len() {
                match children[i].child.try_wait() {
                    Ok(Some(status)) => {
                        let done = children.swap_remove(i);
                        tracing::info!(worker_id = %done.id, %status, "worker drained");
                    }
                    Ok(None) => i += 1,
                    Err(e) => {
                        tracing::warn!(worker_id = %children[i].id, error = %e, "wait failed");
                        i += 1;
                    }
                }
            }
            if children.is_empty() {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        for worker in &mut children {
            tracing::warn!(worker_id = %worker.id, "grace period expired, force-killing worker");
            let _ = worker.child.start_kill();
            let _ = worker.child.wait().await;
        }
        true
    }
}

/// Sliding one-minute budget for worker restarts; prevents fork storms
/// when workers die immediately (bad database path, broken binary).
struct RestartWindow {
    budget: u32,
    events: VecDeque<Instant>,
}

impl RestartWindow {
    fn new(budget: u32) -> Self {
        Self {
            budget,
            events: VecDeque::new(),
        }
    }

    fn allow(&mut self, now: Instant) -> bool {
        while let Some(front) = self.events.front() {
            if now.duration_since(*front) > RESTART_WINDOW {
                self.events.pop_front();
            } else {
                break;
            }
        }
        if self.events.len() >= self.budget as usize {
            return false;
        }
        self.events.push_back(now);
        true
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
