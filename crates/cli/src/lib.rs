// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! pkrs - Pool compliance checks with an offline-safe write queue.
//!
//! This crate provides the functionality behind the `poolkeep` CLI: it
//! classifies water-chemistry readings using [`pk_core`], and buffers
//! writes for a remote store in a durable queue that drains once the
//! connection returns.
//!
//! # Main Components
//!
//! - [`sync::SyncQueue`] - Offline write queue with idempotent delivery
//! - [`sync::QueueStore`] / [`sync::Transport`] - Storage and delivery seams
//! - [`Config`] - Project configuration (default pool, remote store)
//! - [`Error`] - Error types for all operations
//!
//! # Queuing a write
//!
//! ```rust,ignore
//! use pkrs::sync::{JsonlStore, SyncConfig, SyncQueue, WebSocketTransport};
//!
//! let store = JsonlStore::open(Path::new(".poolkeep/queue"))?;
//! let queue = SyncQueue::new(SyncConfig::default(), store, WebSocketTransport::new());
//! queue.enqueue("chemical_test", payload)?;
//!
//! // Later, once online
//! let result = queue.process_pending_items().await?;
//! ```

mod cli;
pub mod colors;
mod commands;
mod display;
pub mod env;
pub mod help;

pub mod config;
pub mod error;
pub mod sync;

pub use cli::{Cli, Command, OutputFormat, QueueCommand};
pub use config::{find_work_dir, init_work_dir, Config, RemoteConfig};
pub use error::{Error, Result};

use clap::CommandFactory;
use clap_complete::generate;

use commands::record::RecordRequest;

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Check {
            chemical,
            value,
            output,
        } => commands::check::run(&chemical, value, output),
        Command::Report { readings, output } => commands::report::report(&readings, output),
        Command::Closure { readings, output } => commands::report::closure(&readings, output),
        Command::Ranges { chemical, output } => {
            commands::ranges::run(chemical.as_deref(), output)
        }
        Command::Record {
            readings,
            pool,
            by,
            notes,
            offline,
            output,
        } => commands::record::run(
            RecordRequest {
                readings,
                pool,
                tested_by: by,
                notes,
                offline,
            },
            output,
        ),
        Command::Queue(cmd) => match cmd {
            QueueCommand::Add {
                record_type,
                payload,
                id,
            } => commands::queue::add(&record_type, payload, id.as_deref()),
            QueueCommand::Stats { output } => commands::queue::stats(output),
            QueueCommand::List { output } => commands::queue::list(output),
            QueueCommand::Dead { output } => commands::queue::dead(output),
            QueueCommand::RetryDead => commands::queue::retry_dead(),
            QueueCommand::Clear { yes } => commands::queue::clear(yes),
        },
        Command::Sync { output } => commands::sync::run(output),
        Command::Init { remote, pool, path } => commands::init::run(remote, pool, path),
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "poolkeep", &mut std::io::stdout());
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
