// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `queuectl list`

use crate::output::{self, OutputFormat};
use crate::table::{Column, Table};
use anyhow::Result;
use clap::Args;
use queuectl_core::JobState;
use queuectl_storage::JobFilter;
use std::path::Path;

#[derive(Args)]
pub struct ListArgs {
    /// Filter by state (pending, processing, completed, failed_transient, dead)
    #[arg(long, value_name = "STATE")]
    pub state: Option<JobState>,

    /// Show only dead-letter jobs (same as --state dead)
    #[arg(long)]
    pub dlq: bool,

    /// Maximum rows to show
    #[arg(long, default_value_t = 50)]
    pub limit: usize,
}

pub async fn handle(args: ListArgs, db: &Path, format: OutputFormat) -> Result<()> {
    let state = if args.dlq {
        Some(JobState::Dead)
    } else {
        args.state
    };
    let filter = JobFilter {
        state,
        limit: Some(args.limit),
    };

    let control = super::open_control(db).await?;
    let jobs = control.list(&filter).await?;

    if format == OutputFormat::Json {
        return output::print_json(&jobs);
    }

    if jobs.is_empty() {
        println!("No jobs");
        return Ok(());
    }

    let mut table = Table::new(vec![
        Column::muted("ID"),
        Column::status("STATE"),
        Column::right("PRIO"),
        Column::right("ATTEMPTS"),
        Column::right("AGE"),
        Column::left("NEXT RUN"),
        Column::left("COMMAND").truncated(48),
    ]);
    for job in &jobs {
        table.row(vec![
            job.id.short(8).to_string(),
            job.state.to_string(),
            job.priority.to_string(),
            format!("{}/{}", job.attempts, job.max_retries + 1),
            output::age_of(job),
            output::next_run_of(job),
            job.command.clone(),
        ]);
    }
    table.render(&mut std::io::stdout());

    let counts = control.counts().await?;
    println!("{}", output::counts_summary(&counts));
    Ok(())
}
