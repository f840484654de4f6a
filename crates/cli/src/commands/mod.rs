// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command handlers

pub mod add;
pub mod initdb;
pub mod list;
pub mod requeue;
pub mod show;
pub mod worker;

use anyhow::Result;
use queuectl_core::{BackoffPolicy, SystemClock};
use queuectl_engine::Control;
use queuectl_storage::Store;
use std::path::Path;

/// Open the store and wrap it in the control surface used by one-shot
/// commands.
pub(crate) async fn open_control(db: &Path) -> Result<Control<SystemClock>> {
    let store = Store::open(db, BackoffPolicy::default()).await?;
    Ok(Control::new(store, SystemClock))
}
