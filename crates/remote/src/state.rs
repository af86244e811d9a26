// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Server state management.
//!
//! Holds the applied-write log and the set of ids already applied, so a
//! redelivered write is acknowledged without being applied twice.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use pk_core::{jsonl, ChemicalTest, Result, CHEMICAL_TEST_TYPE};

const APPLIED_FILE_NAME: &str = "applied.jsonl";

/// One durably applied write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedWrite {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub payload: serde_json::Value,
    pub applied_at: DateTime<Utc>,
}

/// What happened to a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    /// The id was applied earlier; nothing changed.
    Duplicate,
    Rejected(String),
}

/// Shared server state containing the applied-write log.
#[derive(Clone)]
pub struct ServerState {
    inner: Arc<ServerStateInner>,
}

struct ServerStateInner {
    /// Path of the applied-write log.
    path: PathBuf,
    /// Ids already applied (protected by mutex so check-and-append is atomic).
    applied: Mutex<HashSet<String>>,
    /// Record types refused outright.
    reject_types: HashSet<String>,
}

impl ServerState {
    /// Opens the applied-write log in `data_dir`, creating the directory if needed.
    pub fn new(data_dir: &Path, reject_types: HashSet<String>) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(APPLIED_FILE_NAME);
        let applied: HashSet<String> = jsonl::read_all::<AppliedWrite>(&path)?
            .into_iter()
            .map(|w| w.id)
            .collect();

        Ok(ServerState {
            inner: Arc::new(ServerStateInner {
                path,
                applied: Mutex::new(applied),
                reject_types,
            }),
        })
    }

    /// Applies a write unless its id was already applied or it fails validation.
    ///
    /// The write is on disk before `Applied` is returned.
    pub async fn apply_write(
        &self,
        id: &str,
        record_type: &str,
        payload: serde_json::Value,
    ) -> Result<WriteOutcome> {
        let mut applied = self.inner.applied.lock().await;
        if applied.contains(id) {
            return Ok(WriteOutcome::Duplicate);
        }
        if let Some(reason) = self.rejection(id, record_type, &payload) {
            return Ok(WriteOutcome::Rejected(reason));
        }

        let write = AppliedWrite {
            id: id.to_string(),
            record_type: record_type.to_string(),
            payload,
            applied_at: Utc::now(),
        };
        let id = write.id.clone();
        let path = self.inner.path.clone();
        blocking(move || jsonl::append(&path, &write)).await?;
        applied.insert(id);
        Ok(WriteOutcome::Applied)
    }

    fn rejection(&self, id: &str, record_type: &str, payload: &serde_json::Value) -> Option<String> {
        if id.trim().is_empty() {
            return Some("missing id".to_string());
        }
        if record_type.trim().is_empty() {
            return Some("missing record type".to_string());
        }
        if self.inner.reject_types.contains(record_type) {
            return Some(format!("record type '{}' not accepted", record_type));
        }
        if record_type == CHEMICAL_TEST_TYPE {
            if let Err(e) = serde_json::from_value::<ChemicalTest>(payload.clone()) {
                return Some(format!("invalid {}: {}", CHEMICAL_TEST_TYPE, e));
            }
        }
        None
    }

    /// Every applied write, oldest first.
    pub async fn applied_writes(&self) -> Result<Vec<AppliedWrite>> {
        let _guard = self.inner.applied.lock().await;
        let path = self.inner.path.clone();
        blocking(move || jsonl::read_all(&path)).await
    }

    pub async fn applied_count(&self) -> usize {
        self.inner.applied.lock().await.len()
    }
}

/// Runs file I/O on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| pk_core::Error::Io(std::io::Error::other(e.to_string())))?
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
