// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `queuectl initdb`

use anyhow::Result;
use std::path::Path;

pub async fn handle(db: &Path) -> Result<()> {
    let store = queuectl_engine::init_store(db).await?;
    println!("Initialized queue database at {}", store.path().display());
    Ok(())
}
