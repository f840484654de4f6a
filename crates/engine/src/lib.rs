// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! queuectl-engine: execution, worker loop, supervision, and the control
//! surface consumed by the CLI.

pub mod config;
pub mod control;
pub mod executor;
pub mod process;
pub mod supervisor;
pub mod tail;
pub mod worker;

pub use config::{SupervisorConfig, WorkerConfig, DEFAULT_GRACE, DEFAULT_POLL_INTERVAL};
pub use control::{init_store, Control};
pub use executor::{Executor, ShellExecutor, DEFAULT_KILL_GRACE};
pub use supervisor::{Supervisor, SupervisorError, SupervisorOutcome};
pub use tail::TailBuffer;
pub use worker::{Worker, WorkerError};
