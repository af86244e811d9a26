// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline queue management commands.

use super::{open_queue, open_workspace, print_json, print_lines, LocalQueue};
use crate::cli::OutputFormat;
use crate::display::{format_item_detail, format_stats};
use crate::error::{Error, Result};

fn open() -> Result<LocalQueue> {
    let (work_dir, config) = open_workspace()?;
    open_queue(&work_dir, &config)
}

pub fn add(record_type: &str, payload: serde_json::Value, id: Option<&str>) -> Result<()> {
    let queue = open()?;
    let id = add_to(&queue, record_type, payload, id)?;
    println!("Queued {}", id);
    Ok(())
}

pub(crate) fn add_to(
    queue: &LocalQueue,
    record_type: &str,
    payload: serde_json::Value,
    id: Option<&str>,
) -> Result<String> {
    let id = match id {
        Some(id) => queue.enqueue_with_id(id, record_type, payload)?,
        None => queue.enqueue(record_type, payload)?,
    };
    Ok(id)
}

pub fn stats(output: OutputFormat) -> Result<()> {
    let stats = open()?.get_queue_stats()?;
    match output {
        OutputFormat::Text => print_lines(&format_stats(&stats)),
        OutputFormat::Json => print_json(&stats)?,
    }
    Ok(())
}

pub fn list(output: OutputFormat) -> Result<()> {
    let items = open()?.pending_items()?;
    print_items(&items, output, "No pending writes")
}

pub fn dead(output: OutputFormat) -> Result<()> {
    let items = open()?.dead_letters()?;
    print_items(&items, output, "No dead-lettered writes")
}

fn print_items(items: &[pk_core::QueueItem], output: OutputFormat, empty: &str) -> Result<()> {
    match output {
        OutputFormat::Text if items.is_empty() => println!("{}", empty),
        OutputFormat::Text => {
            for item in items {
                print_lines(&format_item_detail(item));
            }
        }
        OutputFormat::Json => print_json(items)?,
    }
    Ok(())
}

pub fn retry_dead() -> Result<()> {
    let count = open()?.retry_dead_letters()?;
    println!("Requeued {} write(s)", count);
    Ok(())
}

pub fn clear(yes: bool) -> Result<()> {
    let removed = clear_in(&open()?, yes)?;
    println!("Cleared {} write(s)", removed);
    Ok(())
}

/// Clearing is irreversible, so a non-empty queue needs explicit confirmation.
pub(crate) fn clear_in(queue: &LocalQueue, yes: bool) -> Result<usize> {
    if !yes {
        let count = queue.get_queue_stats()?.total;
        if count > 0 {
            return Err(Error::ConfirmationRequired { count });
        }
        return Ok(0);
    }
    Ok(queue.clear_queue()?)
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
