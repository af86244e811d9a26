// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Drain the offline queue against the configured remote.

use pk_core::SyncResult;

use super::{open_queue, open_workspace, print_json, print_lines, runtime};
use crate::cli::OutputFormat;
use crate::display::format_sync_result;
use crate::error::{Error, Result};
use crate::sync::{QueueStore, SyncQueue, Transport};

pub fn run(output: OutputFormat) -> Result<()> {
    let (work_dir, config) = open_workspace()?;
    if config.remote.is_none() {
        return Err(Error::NoRemote);
    }
    let queue = open_queue(&work_dir, &config)?;
    let result = runtime()?.block_on(drain(&queue))?;

    match output {
        OutputFormat::Text => print_lines(&format_sync_result(&result)),
        OutputFormat::Json => print_json(&result)?,
    }

    if !result.success {
        return Err(Error::SyncIncomplete {
            synced: result.synced_items,
            failed: result.failed_items,
        });
    }
    Ok(())
}

/// One drain pass; Ctrl-C stops it after the in-flight item.
pub async fn drain<S: QueueStore, T: Transport>(queue: &SyncQueue<S, T>) -> Result<SyncResult> {
    let cancel = queue.cancel_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping after current item");
            cancel.cancel();
        }
    });

    let result = queue.process_pending_items().await;
    interrupt.abort();
    queue.close().await;
    Ok(result?)
}
