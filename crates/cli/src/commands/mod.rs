// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod check;
pub mod init;
pub mod queue;
pub mod ranges;
pub mod record;
pub mod report;
pub mod sync;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{find_work_dir, queue_dir, Config};
use crate::error::Result;
use crate::sync::{JsonlStore, SyncQueue, WebSocketTransport};

/// The queue as the CLI uses it: JSONL files delivered over WebSocket.
pub type LocalQueue = SyncQueue<JsonlStore, WebSocketTransport>;

/// Helper to locate and load the project from the current context.
pub fn open_workspace() -> Result<(PathBuf, Config)> {
    let work_dir = find_work_dir()?;
    let config = Config::load(&work_dir)?;
    Ok((work_dir, config))
}

/// Open the offline queue stored under `work_dir`.
pub fn open_queue(work_dir: &Path, config: &Config) -> Result<LocalQueue> {
    let store = JsonlStore::open(&queue_dir(work_dir))?;
    Ok(SyncQueue::new(
        config.sync_config(),
        store,
        WebSocketTransport::new(),
    ))
}

/// Single-threaded runtime for the commands that talk to the remote.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
