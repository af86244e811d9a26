// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence port for the offline queue.
//!
//! [`JsonlStore`] keeps pending items in `queue.jsonl` and exhausted items in
//! `dead_letter.jsonl`. Appends are fsynced before returning; rewrites go
//! through an atomic rename while holding an exclusive lock on `queue.lock`,
//! so concurrent `poolkeep` processes never interleave a read-modify-write.
//! A drain pass additionally holds `drain.lock` for its whole duration so
//! two processes never send the same snapshot.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use fs2::FileExt;
use pk_core::jsonl;
use pk_core::QueueItem;

const QUEUE_FILE: &str = "queue.jsonl";
const DEAD_LETTER_FILE: &str = "dead_letter.jsonl";
const LOCK_FILE: &str = "queue.lock";
const DRAIN_LOCK_FILE: &str = "drain.lock";

/// Error type for queue storage operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Read or write of a JSONL file failed.
    #[error("storage error: {0}")]
    Storage(#[from] pk_core::Error),

    /// The backend cannot be reached at all.
    #[error("queue store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for queue storage operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Exclusive right to drain a store, released on drop.
#[derive(Debug)]
pub struct DrainLease {
    lock: Option<File>,
}

impl DrainLease {
    /// A lease for a store that only this process can reach.
    pub fn local() -> Self {
        DrainLease { lock: None }
    }
}

impl Drop for DrainLease {
    fn drop(&mut self) {
        if let Some(lock) = &self.lock {
            let _ = FileExt::unlock(lock);
        }
    }
}

/// Durable storage for queue items.
///
/// Implementations must make `append` durable before returning. `update`
/// and `remove` are keyed by item id and are no-ops when the id is absent,
/// so an item cleared mid-drain is never resurrected.
pub trait QueueStore: Send + Sync {
    /// Persist a new pending item.
    fn append(&self, item: &QueueItem) -> QueueResult<()>;

    /// Persist `item` unless its id is already pending or dead-lettered.
    ///
    /// The check and the write are one atomic step. Returns false, writing
    /// nothing, when the id is taken.
    fn append_if_absent(&self, item: &QueueItem) -> QueueResult<bool>;

    /// All pending items, in storage order.
    fn list(&self) -> QueueResult<Vec<QueueItem>>;

    /// Replace the pending item with the same id. Returns false if absent.
    fn update(&self, item: &QueueItem) -> QueueResult<bool>;

    /// Delete the pending item with this id. Returns false if absent.
    fn remove(&self, id: &str) -> QueueResult<bool>;

    /// Delete every pending item, returning how many were removed.
    fn clear(&self) -> QueueResult<usize>;

    /// Move an item from the pending list to the dead-letter list.
    fn dead_letter(&self, item: &QueueItem) -> QueueResult<()>;

    /// All dead-lettered items.
    fn dead_letters(&self) -> QueueResult<Vec<QueueItem>>;

    /// Delete every dead-lettered item, returning how many were removed.
    fn clear_dead_letters(&self) -> QueueResult<usize>;

    /// Move every dead-lettered item back to pending with `attempts` reset.
    ///
    /// An id that is already pending is dropped from the dead-letter list
    /// instead. Returns how many items were requeued.
    fn requeue_dead_letters(&self) -> QueueResult<usize>;

    /// Claim the exclusive right to drain this store.
    ///
    /// Returns `None` while another holder, possibly in another process,
    /// keeps its lease.
    fn begin_drain(&self) -> QueueResult<Option<DrainLease>> {
        Ok(Some(DrainLease::local()))
    }
}

/// File-backed store using JSONL files in a directory.
pub struct JsonlStore {
    dir: PathBuf,
}

impl JsonlStore {
    /// Create or open a store in the given directory.
    pub fn open(dir: &Path) -> QueueResult<Self> {
        fs::create_dir_all(dir)?;
        // Ensure the queue file exists (create if not)
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(QUEUE_FILE))?;

        Ok(JsonlStore {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn queue_path(&self) -> PathBuf {
        self.dir.join(QUEUE_FILE)
    }

    fn dead_letter_path(&self) -> PathBuf {
        self.dir.join(DEAD_LETTER_FILE)
    }

    /// Run `f` while holding the exclusive store lock.
    fn locked<R>(&self, f: impl FnOnce() -> QueueResult<R>) -> QueueResult<R> {
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.dir.join(LOCK_FILE))?;
        lock.lock_exclusive()?;
        let result = f();
        let _ = FileExt::unlock(&lock);
        result
    }

    fn rewrite_queue(&self, items: &[QueueItem]) -> QueueResult<()> {
        jsonl::write_all(&self.queue_path(), items)?;
        Ok(())
    }

    /// Whether `id` is pending or dead-lettered. Caller holds the store lock.
    fn knows_id(&self, id: &str) -> QueueResult<bool> {
        let pending: Vec<QueueItem> = jsonl::read_all(&self.queue_path())?;
        if pending.iter().any(|i| i.id == id) {
            return Ok(true);
        }
        let dead: Vec<QueueItem> = jsonl::read_all(&self.dead_letter_path())?;
        Ok(dead.iter().any(|i| i.id == id))
    }
}

impl QueueStore for JsonlStore {
    fn append(&self, item: &QueueItem) -> QueueResult<()> {
        self.locked(|| Ok(jsonl::append(&self.queue_path(), item)?))
    }

    fn append_if_absent(&self, item: &QueueItem) -> QueueResult<bool> {
        self.locked(|| {
            if self.knows_id(&item.id)? {
                return Ok(false);
            }
            jsonl::append(&self.queue_path(), item)?;
            Ok(true)
        })
    }

    fn list(&self) -> QueueResult<Vec<QueueItem>> {
        self.locked(|| Ok(jsonl::read_all(&self.queue_path())?))
    }

    fn update(&self, item: &QueueItem) -> QueueResult<bool> {
        self.locked(|| {
            let mut items: Vec<QueueItem> = jsonl::read_all(&self.queue_path())?;
            let Some(slot) = items.iter_mut().find(|i| i.id == item.id) else {
                return Ok(false);
            };
            *slot = item.clone();
            self.rewrite_queue(&items)?;
            Ok(true)
        })
    }

    fn remove(&self, id: &str) -> QueueResult<bool> {
        self.locked(|| {
            let mut items: Vec<QueueItem> = jsonl::read_all(&self.queue_path())?;
            let before = items.len();
            items.retain(|i| i.id != id);
            if items.len() == before {
                return Ok(false);
            }
            self.rewrite_queue(&items)?;
            Ok(true)
        })
    }

    fn clear(&self) -> QueueResult<usize> {
        self.locked(|| {
            let items: Vec<QueueItem> = jsonl::read_all(&self.queue_path())?;
            File::create(self.queue_path())?.sync_all()?;
            Ok(items.len())
        })
    }

    fn dead_letter(&self, item: &QueueItem) -> QueueResult<()> {
        self.locked(|| {
            // Written to the dead-letter file first: a crash in between leaves
            // the item in both lists rather than in neither.
            jsonl::append(&self.dead_letter_path(), item)?;
            let mut items: Vec<QueueItem> = jsonl::read_all(&self.queue_path())?;
            items.retain(|i| i.id != item.id);
            self.rewrite_queue(&items)
        })
    }

    fn dead_letters(&self) -> QueueResult<Vec<QueueItem>> {
        self.locked(|| Ok(jsonl::read_all(&self.dead_letter_path())?))
    }

    fn clear_dead_letters(&self) -> QueueResult<usize> {
        self.locked(|| {
            let items: Vec<QueueItem> = jsonl::read_all(&self.dead_letter_path())?;
            jsonl::write_all::<QueueItem>(&self.dead_letter_path(), &[])?;
            Ok(items.len())
        })
    }

    fn requeue_dead_letters(&self) -> QueueResult<usize> {
        self.locked(|| {
            let dead: Vec<QueueItem> = jsonl::read_all(&self.dead_letter_path())?;
            if dead.is_empty() {
                return Ok(0);
            }
            let mut pending: Vec<QueueItem> = jsonl::read_all(&self.queue_path())?;
            let mut requeued = 0;
            for mut item in dead {
                if pending.iter().any(|i| i.id == item.id) {
                    continue;
                }
                item.attempts = 0;
                pending.push(item);
                requeued += 1;
            }
            // Queue first: a crash in between leaves items in both lists, and
            // the next requeue skips the ids already pending.
            self.rewrite_queue(&pending)?;
            jsonl::write_all::<QueueItem>(&self.dead_letter_path(), &[])?;
            Ok(requeued)
        })
    }

    fn begin_drain(&self) -> QueueResult<Option<DrainLease>> {
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.dir.join(DRAIN_LOCK_FILE))?;
        match lock.try_lock_exclusive() {
            Ok(()) => Ok(Some(DrainLease { lock: Some(lock) })),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests and for hosts that bring their own durability.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    pending: Vec<QueueItem>,
    dead: Vec<QueueItem>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl QueueStore for MemoryStore {
    fn append(&self, item: &QueueItem) -> QueueResult<()> {
        self.state().pending.push(item.clone());
        Ok(())
    }

    fn append_if_absent(&self, item: &QueueItem) -> QueueResult<bool> {
        let mut state = self.state();
        let taken = state
            .pending
            .iter()
            .chain(state.dead.iter())
            .any(|i| i.id == item.id);
        if !taken {
            state.pending.push(item.clone());
        }
        Ok(!taken)
    }

    fn list(&self) -> QueueResult<Vec<QueueItem>> {
        Ok(self.state().pending.clone())
    }

    fn update(&self, item: &QueueItem) -> QueueResult<bool> {
        let mut state = self.state();
        match state.pending.iter_mut().find(|i| i.id == item.id) {
            Some(slot) => {
                *slot = item.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove(&self, id: &str) -> QueueResult<bool> {
        let mut state = self.state();
        let before = state.pending.len();
        state.pending.retain(|i| i.id != id);
        Ok(state.pending.len() != before)
    }

    fn clear(&self) -> QueueResult<usize> {
        let mut state = self.state();
        let n = state.pending.len();
        state.pending.clear();
        Ok(n)
    }

    fn dead_letter(&self, item: &QueueItem) -> QueueResult<()> {
        let mut state = self.state();
        state.pending.retain(|i| i.id != item.id);
        state.dead.push(item.clone());
        Ok(())
    }

    fn dead_letters(&self) -> QueueResult<Vec<QueueItem>> {
        Ok(self.state().dead.clone())
    }

    fn clear_dead_letters(&self) -> QueueResult<usize> {
        let mut state = self.state();
        let n = state.dead.len();
        state.dead.clear();
        Ok(n)
    }

    fn requeue_dead_letters(&self) -> QueueResult<usize> {
        let mut state = self.state();
        let dead = std::mem::take(&mut state.dead);
        let mut requeued = 0;
        for mut item in dead {
            if state.pending.iter().any(|i| i.id == item.id) {
                continue;
            }
            item.attempts = 0;
            state.pending.push(item);
            requeued += 1;
        }
        Ok(requeued)
    }
}
