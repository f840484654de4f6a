// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `queuectl show`

use crate::output::{self, OutputFormat};
use anyhow::Result;
use clap::Args;
use std::path::Path;

#[derive(Args)]
pub struct ShowArgs {
    /// Job id (or unique prefix)
    pub id: String,
}

pub async fn handle(args: ShowArgs, db: &Path, format: OutputFormat) -> Result<()> {
    let control = super::open_control(db).await?;
    let job = control.get(&args.id).await?;

    match format {
        OutputFormat::Json => output::print_json(&job),
        OutputFormat::Text => {
            output::print_job_details(&job);
            Ok(())
        }
    }
}
