// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! queuectl - persistent background job queue CLI

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod color;
mod commands;
mod exit_error;
mod output;
mod table;

use anyhow::Result;
use clap::{Parser, Subcommand};
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "queuectl",
    version,
    about = "Persistent background job queue for a single host"
)]
struct Cli {
    /// Path to the queue database file
    #[arg(
        long = "db",
        global = true,
        value_name = "PATH",
        default_value = "queue.db"
    )]
    db: PathBuf,

    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t,
        global = true
    )]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the queue database schema (idempotent)
    Initdb,
    /// Enqueue a shell command; prints the new job id
    Add(commands::add::AddArgs),
    /// List jobs
    List(commands::list::ListArgs),
    /// Show one job in full, including output tails
    Show(commands::show::ShowArgs),
    /// Move a dead job back to pending with a fresh retry budget
    Requeue(commands::requeue::RequeueArgs),
    /// Run a pool of worker processes until signalled
    Worker(commands::worker::WorkerArgs),
    /// Internal: single worker process spawned by `worker`
    #[command(name = "worker-child", hide = true)]
    WorkerChild(commands::worker::WorkerChildArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        let code = e
            .downcast_ref::<exit_error::ExitError>()
            .map_or(1, |c| c.code);
        let msg = render_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {}", msg);
        }
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Initdb => commands::initdb::handle(&cli.db).await,
        Commands::Add(args) => commands::add::handle(args, &cli.db, cli.output).await,
        Commands::List(args) => commands::list::handle(args, &cli.db, cli.output).await,
        Commands::Show(args) => commands::show::handle(args, &cli.db, cli.output).await,
        Commands::Requeue(args) => commands::requeue::handle(args, &cli.db, cli.output).await,
        Commands::Worker(args) => commands::worker::handle(args, &cli.db).await,
        Commands::WorkerChild(args) => commands::worker::handle_child(args, &cli.db).await,
    }
}

/// Render an error for stderr.
///
/// Store and engine errors often embed their source text in their own
/// Display, so each nested cause is appended only when it adds something
/// the message so far does not already say.
fn render_error(err: &anyhow::Error) -> String {
    let mut rendered = err.to_string();
    for source in err.chain().skip(1) {
        let detail = source.to_string();
        if !rendered.contains(&detail) {
            rendered.push_str("\n  caused by: ");
            rendered.push_str(&detail);
        }
    }
    rendered
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
