// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `queuectl worker` (supervisor) and the hidden per-worker child command.

use crate::exit_error::ExitError;
use anyhow::Result;
use clap::Args;
use queuectl_core::{BackoffPolicy, SystemClock, WorkerId, DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_CAP};
use queuectl_engine::{ShellExecutor, Supervisor, SupervisorConfig, Worker, WorkerConfig};
use queuectl_storage::Store;
use std::path::Path;
use std::time::Duration;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;

#[derive(Args)]
pub struct WorkerArgs {
    /// Number of worker processes
    #[arg(short = 'n', long = "workers", default_value_t = 1)]
    pub workers: u32,

    /// Exponent base for retry backoff delays
    #[arg(long = "backoff-base", default_value_t = DEFAULT_BACKOFF_BASE)]
    pub backoff_base: f64,

    /// Per-job execution timeout in seconds (unbounded when omitted)
    #[arg(long = "timeout", value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Sleep between empty polls, in seconds
    #[arg(long = "poll-interval", default_value_t = 1.0, value_name = "SECONDS")]
    pub poll_interval: f64,

    /// Shutdown drain window in seconds
    #[arg(long = "grace", default_value_t = 30, value_name = "SECONDS")]
    pub grace: u64,

    /// Claim age before a processing job is considered orphaned
    #[arg(long = "reap-after", value_name = "SECONDS")]
    pub reap_after: Option<u64>,
}

/// Flags for one worker process; built by the supervisor, not typed by
/// hand.
#[derive(Args)]
pub struct WorkerChildArgs {
    #[arg(long = "worker-id")]
    pub worker_id: String,

    #[arg(long = "poll-interval-ms", default_value_t = 1000)]
    pub poll_interval_ms: u64,

    #[arg(long = "backoff-base", default_value_t = DEFAULT_BACKOFF_BASE)]
    pub backoff_base: f64,

    #[arg(long = "timeout-secs")]
    pub timeout_secs: Option<u64>,

    #[arg(long = "reap-after-secs", default_value_t = 300)]
    pub reap_after_secs: u64,
}

pub async fn handle(args: WorkerArgs, db: &Path) -> Result<()> {
    init_tracing();

    // Validate up front what the children would otherwise die on, so a
    // bad flag or missing database fails fast instead of burning the
    // restart budget.
    let backoff = BackoffPolicy::new(args.backoff_base, DEFAULT_BACKOFF_CAP)?;
    Store::open(db, backoff).await?;

    let mut config = SupervisorConfig::new(db.to_path_buf());
    config.workers = args.workers.max(1);
    config.backoff_base = args.backoff_base;
    config.poll_interval = Duration::from_secs_f64(args.poll_interval.max(0.01));
    config.timeout = args.timeout.map(Duration::from_secs);
    config.grace = Duration::from_secs(args.grace);
    config.reap_after = args.reap_after.map(Duration::from_secs);

    let outcome = Supervisor::new(config).run().await?;
    if !outcome.is_graceful() {
        return Err(ExitError::new(1, "worker pool exited ungracefully").into());
    }
    Ok(())
}

pub async fn handle_child(args: WorkerChildArgs, db: &Path) -> Result<()> {
    init_tracing();

    let backoff = BackoffPolicy::new(args.backoff_base, DEFAULT_BACKOFF_CAP)?;
    let store = Store::open(db, backoff).await?;

    let mut config = WorkerConfig::new(WorkerId::new(args.worker_id));
    config.poll_interval = Duration::from_millis(args.poll_interval_ms.max(1));
    config.timeout = args.timeout_secs.map(Duration::from_secs);
    config.reap_threshold = Duration::from_secs(args.reap_after_secs);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    spawn_shutdown_listener(shutdown_tx);

    let worker = Worker::new(store, ShellExecutor::new(), SystemClock, config);
    worker.run(shutdown_rx).await?;
    Ok(())
}

/// Flip the shutdown flag on SIGTERM/SIGINT; the worker drains its
/// current job and stops claiming new ones.
fn spawn_shutdown_listener(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let (Ok(mut sigterm), Ok(mut sigint)) = (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) else {
            tracing::error!("failed to install signal handlers");
            return;
        };
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
        tracing::info!("shutdown signal received, draining current job");
        let _ = shutdown_tx.send(true);
    });
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
