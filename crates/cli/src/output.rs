// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting shared by the command handlers.

use crate::color;
use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use queuectl_core::{format_age, Job};
use queuectl_storage::StateCounts;
use serde::Serialize;

/// Output format selected with `-o/--output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Full field block for `show`.
pub fn print_job_details(job: &Job) {
    let fmt_time =
        |t: chrono::DateTime<Utc>| t.to_rfc3339_opts(SecondsFormat::Millis, true);
    let opt = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());

    println!("id:             {}", job.id);
    println!("state:          {}", color::status(job.state.as_str()));
    println!("command:        {}", job.command);
    println!("priority:       {}", job.priority);
    println!("attempts:       {} (max retries {})", job.attempts, job.max_retries);
    println!("run at:         {}", fmt_time(job.run_at));
    println!("created at:     {}", fmt_time(job.created_at));
    println!("updated at:     {}", fmt_time(job.updated_at));
    println!(
        "worker:         {}",
        opt(job.worker_id.as_ref().map(|w| w.to_string()))
    );
    println!("claimed at:     {}", opt(job.claimed_at.map(fmt_time)));
    println!(
        "last exit code: {}",
        opt(job.last_exit_code.map(|c| c.to_string()))
    );
    print_tail("stdout tail", job.stdout_tail.as_deref());
    print_tail("stderr tail", job.stderr_tail.as_deref());
}

fn print_tail(label: &str, tail: Option<&str>) {
    match tail {
        None => println!("{}:    -", label),
        Some("") => println!("{}:    (empty)", label),
        Some(text) => {
            println!("{}:", label);
            for line in text.lines() {
                println!("  {}", line);
            }
        }
    }
}

/// Age of a job's creation relative to now, for list views.
pub fn age_of(job: &Job) -> String {
    format_age(job.created_at, Utc::now())
}

/// When the job will next be eligible to run, or `-` for states where
/// `run_at` is meaningless.
pub fn next_run_of(job: &Job) -> String {
    if job.state.is_ready() {
        format_age(job.run_at, Utc::now())
    } else {
        "-".to_string()
    }
}

/// One-line per-state summary for the list footer.
pub fn counts_summary(counts: &StateCounts) -> String {
    format!(
        "{} pending · {} processing · {} retrying · {} completed · {} dead",
        counts.pending,
        counts.processing,
        counts.failed_transient,
        counts.completed,
        counts.dead
    )
}
