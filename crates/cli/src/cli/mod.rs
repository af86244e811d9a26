// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::colors;
use crate::help;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Parse a JSON document given on the command line.
fn json_value(s: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(s).map_err(|e| format!("invalid JSON: {}", e))
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "poolkeep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(disable_version_flag = true)]
#[command(about = "Pool water-chemistry compliance with an offline-safe write queue")]
#[command(
    long_about = "Pool water-chemistry compliance with an offline-safe write queue.\n\n\
    Classify readings against health standards, decide closures, and record tests \
    that are delivered to a remote store now or queued until the connection returns."
)]
#[command(help_template = help::template())]
#[command(before_help = help::commands())]
#[command(after_help = help::quickstart())]
#[command(styles = help::styles())]
// Allow the unit type field pattern which is required for clap's ArgAction::Version/Help
#[allow(clippy::manual_non_exhaustive)]
pub struct Cli {
    /// Print version
    #[arg(short = 'v', short_alias = 'V', long = "version", action = clap::ArgAction::Version)]
    version: (),

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    // ─────────────────────────────────────────────────────────────────────────
    // Water chemistry
    // ─────────────────────────────────────────────────────────────────────────
    /// Validate a single reading
    #[command(after_help = colors::examples("\
Examples:
  poolkeep check ph 7.4              Good reading
  poolkeep check fc 0.5              Critically low free chlorine
  poolkeep check temperature 84 -o json"))]
    Check {
        /// Chemical name or alias (fc, tc, ph, ta, cya, ch, temp)
        chemical: String,

        /// Measured value
        #[arg(allow_negative_numbers = true)]
        value: f64,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Compliance report for a full test
    #[command(after_help = colors::examples("\
Examples:
  poolkeep report ph=7.4 fc=2.5 ta=100
  poolkeep report ph=8.6 cya=120 -o json"))]
    Report {
        /// Readings as name=value
        #[arg(required = true, value_name = "NAME=VALUE")]
        readings: Vec<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Decide whether the pool must close
    Closure {
        /// Readings as name=value
        #[arg(required = true, value_name = "NAME=VALUE")]
        readings: Vec<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show acceptable and ideal ranges
    Ranges {
        /// Limit to one chemical
        chemical: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Record a chemical test (delivered now or queued)
    #[command(after_help = colors::examples("\
Examples:
  poolkeep record --pool main ph=7.4 fc=2.5       Deliver or queue
  poolkeep record --offline ph=7.6 ta=90          Queue without trying the remote
  poolkeep record --by jo --notes \"after rain\" ph=7.1"))]
    Record {
        /// Readings as name=value
        #[arg(required = true, value_name = "NAME=VALUE")]
        readings: Vec<String>,

        /// Pool id (defaults to default_pool from config)
        #[arg(long, short, value_parser = non_empty_string)]
        pool: Option<String>,

        /// Who took the readings
        #[arg(long)]
        by: Option<String>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,

        /// Queue without attempting delivery
        #[arg(long)]
        offline: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Offline queue
    // ─────────────────────────────────────────────────────────────────────────
    /// Inspect and manage the offline queue
    #[command(subcommand)]
    Queue(QueueCommand),

    /// Deliver queued writes to the remote
    Sync {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Setup
    // ─────────────────────────────────────────────────────────────────────────
    /// Initialize poolkeep in a directory
    #[command(after_help = colors::examples("\
Examples:
  poolkeep init                               Queue-only, no remote
  poolkeep init --remote ws://server:7890     Deliver to a remote store
  poolkeep init --pool main                   Default pool for record"))]
    Init {
        /// WebSocket URL of the remote store
        #[arg(long)]
        remote: Option<String>,

        /// Default pool id for recorded tests
        #[arg(long, value_parser = non_empty_string)]
        pool: Option<String>,

        /// Directory to initialize (defaults to current directory)
        #[arg(long)]
        path: Option<String>,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum QueueCommand {
    /// Queue an arbitrary write
    Add {
        /// Record type, e.g. chemical_test or maintenance_log
        #[arg(value_parser = non_empty_string)]
        record_type: String,

        /// Record body as JSON
        #[arg(value_parser = json_value)]
        payload: serde_json::Value,

        /// Caller-chosen id; queuing the same id twice is a no-op
        #[arg(long, value_parser = non_empty_string)]
        id: Option<String>,
    },

    /// Show queue counts
    Stats {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// List pending writes in delivery order
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// List dead-lettered writes
    Dead {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Move dead-lettered writes back into the queue
    RetryDead,

    /// Discard every pending write
    Clear {
        /// Confirm the irreversible clear
        #[arg(long, short)]
        yes: bool,
    },
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
