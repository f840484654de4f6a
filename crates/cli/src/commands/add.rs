// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `queuectl add`

use crate::output::{self, OutputFormat};
use anyhow::Result;
use clap::Args;
use queuectl_core::{parse_rfc3339_utc, NewJob, DEFAULT_MAX_RETRIES};
use std::path::Path;

#[derive(Args)]
pub struct AddArgs {
    /// Shell command line to execute
    pub command: String,

    /// Dequeue priority; higher runs earlier
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub priority: i64,

    /// Failed attempts allowed before the job moves to the DLQ
    #[arg(long = "max-retries", default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Earliest run time, RFC 3339 with an explicit offset
    #[arg(long = "run-at", value_name = "TIMESTAMP")]
    pub run_at: Option<String>,
}

pub async fn handle(args: AddArgs, db: &Path, format: OutputFormat) -> Result<()> {
    let run_at = args
        .run_at
        .as_deref()
        .map(parse_rfc3339_utc)
        .transpose()?;

    let mut new = NewJob::new(args.command)
        .priority(args.priority)
        .max_retries(args.max_retries);
    if let Some(run_at) = run_at {
        new = new.run_at(run_at);
    }

    let control = super::open_control(db).await?;
    let job = control.enqueue(new).await?;

    match format {
        OutputFormat::Json => output::print_json(&job),
        OutputFormat::Text => {
            println!("{}", job.id);
            Ok(())
        }
    }
}
