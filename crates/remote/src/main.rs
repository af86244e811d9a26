// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! pk-remote: WebSocket store for poolkeep writes.
//!
//! Applies each write at most once, keyed by its id, and acknowledges
//! redeliveries so an offline queue can retry safely.

mod server;
mod state;

use clap::Parser;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// pk-remote: Remote store for poolkeep
#[derive(Parser, Debug)]
#[command(name = "pk-remote")]
#[command(about = "WebSocket store that applies poolkeep writes exactly once")]
struct Args {
    /// Address to bind the server to
    #[arg(short, long, default_value = "0.0.0.0:7890")]
    bind: SocketAddr,

    /// Directory for the applied-write log
    #[arg(short, long, default_value = ".")]
    data: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Refuse writes of this record type (repeatable)
    #[arg(long = "reject-type", value_name = "TYPE")]
    reject_types: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting pk-remote server");
    info!("  Bind address: {}", args.bind);
    info!("  Data directory: {}", args.data.display());
    if !args.reject_types.is_empty() {
        info!("  Rejecting types: {}", args.reject_types.join(", "));
    }

    let reject_types: HashSet<String> = args.reject_types.into_iter().collect();
    let state = state::ServerState::new(&args.data, reject_types)?;
    info!("  Applied writes: {}", state.applied_count().await);

    server::run(args.bind, state).await?;

    Ok(())
}
