// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `queuectl requeue`

use crate::output::{self, OutputFormat};
use anyhow::Result;
use clap::Args;
use std::path::Path;

#[derive(Args)]
pub struct RequeueArgs {
    /// Job id (or unique prefix); must be in the DLQ
    pub id: String,
}

pub async fn handle(args: RequeueArgs, db: &Path, format: OutputFormat) -> Result<()> {
    let control = super::open_control(db).await?;
    let job = control.requeue(&args.id).await?;

    match format {
        OutputFormat::Json => output::print_json(&job),
        OutputFormat::Text => {
            println!("Requeued job {}", job.id);
            Ok(())
        }
    }
}
