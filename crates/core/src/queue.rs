// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue item model shared by the offline queue and its reporting.
//!
//! A [`QueueItem`] is a write that could not reach the remote store. Its
//! `id` doubles as the idempotency key on the wire, so it never changes
//! across retries.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A buffered write awaiting delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Stable identifier, sent as the idempotency key.
    pub id: String,
    /// Record type, e.g. `chemical_test`. Opaque to the queue.
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record body. Opaque to the queue.
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    /// Number of failed delivery attempts so far.
    #[serde(default)]
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl QueueItem {
    /// Creates a fresh item with no attempts.
    pub fn new(
        id: impl Into<String>,
        record_type: impl Into<String>,
        payload: serde_json::Value,
        created_at: DateTime<Utc>,
    ) -> Self {
        QueueItem {
            id: id.into(),
            record_type: record_type.into(),
            payload,
            created_at,
            attempts: 0,
            last_error: None,
        }
    }

    /// Records a failed delivery attempt.
    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.attempts = self.attempts.saturating_add(1);
        self.last_error = Some(error.into());
    }

    /// FIFO order: oldest first, ties broken by id.
    pub fn fifo_cmp(&self, other: &Self) -> Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Sorts items into delivery order.
pub fn sort_fifo(items: &mut [QueueItem]) {
    items.sort_by(QueueItem::fifo_cmp);
}

/// Generate a queue item ID from record type, payload, and timestamp.
/// Format: q-{hash} where hash is the first 12 hex chars of SHA256.
pub fn generate_item_id(
    record_type: &str,
    payload: &serde_json::Value,
    created_at: &DateTime<Utc>,
) -> String {
    let input = format!(
        "{}{}{}",
        record_type,
        payload,
        created_at.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true)
    );
    let hash = Sha256::digest(input.as_bytes());
    format!("q-{}", hex::encode(&hash[..6]))
}

/// Generate a unique item ID, appending an incrementing suffix on collision.
pub fn generate_unique_item_id<F>(
    record_type: &str,
    payload: &serde_json::Value,
    created_at: &DateTime<Utc>,
    exists: F,
) -> String
where
    F: Fn(&str) -> bool,
{
    let base_id = generate_item_id(record_type, payload, created_at);

    if !exists(&base_id) {
        return base_id;
    }

    let mut suffix = 2;
    loop {
        let id = format!("{}-{}", base_id, suffix);
        if !exists(&id) {
            return id;
        }
        suffix += 1;
    }
}

/// Read-only projection of the queue, computed on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Pending items.
    pub total: usize,
    /// Pending items per record type.
    pub by_type: BTreeMap<String, usize>,
    /// Items moved aside after exhausting their attempts.
    pub dead_lettered: usize,
}

impl QueueStats {
    pub fn from_items(pending: &[QueueItem], dead_lettered: usize) -> Self {
        let mut by_type = BTreeMap::new();
        for item in pending {
            *by_type.entry(item.record_type.clone()).or_insert(0) += 1;
        }
        QueueStats {
            total: pending.len(),
            by_type,
            dead_lettered,
        }
    }
}

/// A single failed item within a drain pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncItemError {
    pub id: String,
    pub error: String,
}

/// Outcome of one drain pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    /// True iff no item failed.
    pub success: bool,
    pub synced_items: usize,
    pub failed_items: usize,
    /// Failed items that were moved to the dead-letter list this pass.
    #[serde(default)]
    pub dead_lettered: usize,
    /// Items left untouched because the pass was cancelled.
    #[serde(default)]
    pub skipped_items: usize,
    pub errors: Vec<SyncItemError>,
}

impl SyncResult {
    /// A pass that had nothing to do.
    pub fn empty() -> Self {
        SyncResult {
            success: true,
            ..Default::default()
        }
    }

    pub fn record_synced(&mut self) {
        self.synced_items += 1;
    }

    pub fn record_failed(&mut self, id: impl Into<String>, error: impl Into<String>) {
        self.failed_items += 1;
        self.errors.push(SyncItemError {
            id: id.into(),
            error: error.into(),
        });
    }

    /// Fixes `success` once every item has been accounted for.
    pub fn finish(mut self) -> Self {
        self.success = self.failed_items == 0;
        self
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
