// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline write queue with drain-on-reconnect.
//!
//! Writes that cannot reach the remote store are persisted through a
//! [`QueueStore`] and delivered later by [`SyncQueue::process_pending_items`].
//! An item leaves the queue only when the remote acknowledges it; every
//! other outcome (rejection, broken connection, timeout) keeps it pending
//! with `attempts` incremented. The item id travels as the idempotency key,
//! so a redelivery after an ambiguous outcome is harmless.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use pk_core::queue::{generate_unique_item_id, sort_fifo};
use pk_core::{QueueItem, QueueStats, SyncResult};
use tracing::{debug, info, warn};

use super::store::{QueueError, QueueStore};
use super::transport::{Ack, Transport, TransportError, WriteRequest};

/// Configuration for draining the queue.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// URL of the remote store.
    pub url: String,
    /// Maximum time to wait for one item's acknowledgement.
    pub send_timeout: Duration,
    /// Maximum time to wait when (re)connecting.
    pub connect_timeout: Duration,
    /// Move an item to the dead-letter list once it has failed this many
    /// times. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            url: "ws://localhost:7890".to_string(),
            send_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(2),
            max_attempts: None,
        }
    }
}

/// Error type for sync queue operations.
///
/// Per-item delivery failures are never errors; they are reported in
/// [`SyncResult::errors`]. Only storage failures and misuse surface here.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Queue storage failed; the durability guarantee cannot be kept.
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    /// Another drain pass is running.
    #[error("sync already in progress")]
    AlreadyInProgress,

    /// The item cannot be queued.
    #[error("invalid queue item: {0}")]
    InvalidItem(String),
}

/// Result type for sync queue operations.
pub type SyncQueueResult<T> = Result<T, SyncError>;

/// How a submitted write was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The remote acknowledged the write immediately.
    Delivered { id: String },
    /// The write was queued for a later drain pass.
    Queued { id: String, reason: String },
}

impl Submission {
    pub fn id(&self) -> &str {
        match self {
            Submission::Delivered { id } | Submission::Queued { id, .. } => id,
        }
    }
}

/// Handle for stopping an in-flight drain pass.
///
/// Items not yet attempted when the token fires are left pending untouched.
/// A cancel requested while no pass runs stops the next pass before its
/// first item. The token clears when a pass ends.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Clears the drain flag and any cancel request however the pass ends.
struct DrainGuard<'a> {
    draining: &'a AtomicBool,
    cancel: &'a CancelToken,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.cancel.reset();
        self.draining.store(false, Ordering::Release);
    }
}

/// Durable offline queue bound to a store and a transport.
///
/// All methods take `&self`; share it behind an `Arc` to enqueue from one
/// task while another drains.
pub struct SyncQueue<S: QueueStore, T: Transport> {
    config: SyncConfig,
    store: S,
    transport: tokio::sync::Mutex<T>,
    draining: AtomicBool,
    cancel: CancelToken,
    last_result: Mutex<Option<SyncResult>>,
}

impl<S: QueueStore, T: Transport> SyncQueue<S, T> {
    pub fn new(config: SyncConfig, store: S, transport: T) -> Self {
        SyncQueue {
            config,
            store,
            transport: tokio::sync::Mutex::new(transport),
            draining: AtomicBool::new(false),
            cancel: CancelToken::default(),
            last_result: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Queue a write under a freshly generated id.
    ///
    /// The item is durable when this returns. Never touches the network.
    pub fn enqueue(
        &self,
        record_type: &str,
        payload: serde_json::Value,
    ) -> SyncQueueResult<String> {
        validate_record_type(record_type)?;
        let created_at = Utc::now();
        let mut taken = self.known_ids()?;
        loop {
            let id = generate_unique_item_id(record_type, &payload, &created_at, |id| {
                taken.contains(id)
            });
            let item = QueueItem::new(id.clone(), record_type, payload.clone(), created_at);
            if self.store.append_if_absent(&item)? {
                info!(id = %id, record_type, "queued write");
                return Ok(id);
            }
            // Another handle claimed the id since the snapshot.
            taken.insert(id);
        }
    }

    /// Queue a write under a caller-supplied id.
    ///
    /// Queuing an id that is already pending or dead-lettered is a no-op.
    pub fn enqueue_with_id(
        &self,
        id: &str,
        record_type: &str,
        payload: serde_json::Value,
    ) -> SyncQueueResult<String> {
        validate_record_type(record_type)?;
        if id.trim().is_empty() {
            return Err(SyncError::InvalidItem("id cannot be empty".to_string()));
        }
        let item = QueueItem::new(id, record_type, payload, Utc::now());
        if self.store.append_if_absent(&item)? {
            info!(id, record_type, "queued write");
        } else {
            debug!(id, "already queued, ignoring");
        }
        Ok(id.to_string())
    }

    fn known_ids(&self) -> SyncQueueResult<HashSet<String>> {
        let mut ids: HashSet<String> = self.store.list()?.into_iter().map(|i| i.id).collect();
        ids.extend(self.store.dead_letters()?.into_iter().map(|i| i.id));
        Ok(ids)
    }

    /// Deliver a write now if the remote answers, otherwise queue it.
    ///
    /// The id is generated before the first attempt, so a write whose
    /// acknowledgement was lost is queued under the same idempotency key.
    pub async fn submit(
        &self,
        record_type: &str,
        payload: serde_json::Value,
    ) -> SyncQueueResult<Submission> {
        validate_record_type(record_type)?;
        let created_at = Utc::now();
        let taken = self.known_ids()?;
        let id = generate_unique_item_id(record_type, &payload, &created_at, |id| {
            taken.contains(id)
        });
        let request = WriteRequest {
            id: id.clone(),
            record_type: record_type.to_string(),
            payload: payload.clone(),
        };

        let outcome = {
            let mut transport = self.transport.lock().await;
            match self.ensure_connected(&mut *transport).await {
                Ok(()) => self.send_with_timeout(&mut *transport, request).await,
                Err(e) => Err(e),
            }
        };

        match outcome {
            Ok(ack) => {
                info!(id = %ack.id, duplicate = ack.duplicate, "delivered write");
                Ok(Submission::Delivered { id })
            }
            Err(e) => {
                let item = QueueItem::new(id.clone(), record_type, payload, created_at);
                if self.store.append_if_absent(&item)? {
                    warn!(id = %id, error = %e, "delivery failed, queued write");
                } else {
                    debug!(id = %id, error = %e, "delivery failed, id already queued");
                }
                Ok(Submission::Queued {
                    id,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Run one drain pass over the items pending when the pass starts.
    ///
    /// Items are attempted sequentially in FIFO order; one failure never
    /// stops the pass. Returns [`SyncError::AlreadyInProgress`] immediately
    /// if another pass is running, in this process or in another one
    /// sharing the store.
    pub async fn process_pending_items(&self) -> SyncQueueResult<SyncResult> {
        if self
            .draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("drain requested while another is running");
            return Err(SyncError::AlreadyInProgress);
        }
        let _guard = DrainGuard {
            draining: &self.draining,
            cancel: &self.cancel,
        };
        let Some(_lease) = self.store.begin_drain()? else {
            debug!("another process is draining this queue");
            return Err(SyncError::AlreadyInProgress);
        };

        let mut items = self.store.list()?;
        sort_fifo(&mut items);

        if items.is_empty() {
            let result = SyncResult::empty();
            self.remember(&result);
            return Ok(result);
        }

        info!(pending = items.len(), "sync started");

        let mut result = SyncResult::default();
        let mut transport = self.transport.lock().await;
        // Once a reconnect fails, the rest of the pass fails fast with the same error.
        let mut connect_error: Option<String> = None;
        let total = items.len();

        for (index, item) in items.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                result.skipped_items = total - index;
                info!(skipped = result.skipped_items, "sync cancelled");
                break;
            }

            if let Some(ref error) = connect_error {
                self.fail_item(item, error.clone(), &mut result)?;
                continue;
            }

            if let Err(e) = self.ensure_connected(&mut *transport).await {
                let error = e.to_string();
                connect_error = Some(error.clone());
                self.fail_item(item, error, &mut result)?;
                continue;
            }

            match self
                .send_with_timeout(&mut *transport, WriteRequest::from(&item))
                .await
            {
                Ok(ack) => {
                    self.store.remove(&item.id)?;
                    result.record_synced();
                    debug!(id = %item.id, duplicate = ack.duplicate, "synced");
                }
                Err(e) => {
                    self.fail_item(item, e.to_string(), &mut result)?;
                }
            }
        }

        let result = result.finish();
        info!(
            synced = result.synced_items,
            failed = result.failed_items,
            dead_lettered = result.dead_lettered,
            "sync finished"
        );
        self.remember(&result);
        Ok(result)
    }

    async fn ensure_connected(&self, transport: &mut T) -> Result<(), TransportError> {
        if transport.is_connected() {
            return Ok(());
        }
        match tokio::time::timeout(self.config.connect_timeout, transport.connect(&self.config.url))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(millis(self.config.connect_timeout))),
        }
    }

    async fn send_with_timeout(
        &self,
        transport: &mut T,
        request: WriteRequest,
    ) -> Result<Ack, TransportError> {
        match tokio::time::timeout(self.config.send_timeout, transport.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(millis(self.config.send_timeout))),
        }
    }

    fn fail_item(
        &self,
        mut item: QueueItem,
        error: String,
        result: &mut SyncResult,
    ) -> SyncQueueResult<()> {
        item.record_failure(error.clone());
        let exhausted = self
            .config
            .max_attempts
            .is_some_and(|max| item.attempts >= max);

        if exhausted {
            self.store.dead_letter(&item)?;
            result.dead_lettered += 1;
            warn!(id = %item.id, attempts = item.attempts, error = %error, "moved to dead letters");
        } else {
            self.store.update(&item)?;
            debug!(id = %item.id, attempts = item.attempts, error = %error, "sync failed");
        }
        result.record_failed(item.id, error);
        Ok(())
    }

    fn remember(&self, result: &SyncResult) {
        let mut last = self.last_result.lock().unwrap_or_else(|e| e.into_inner());
        *last = Some(result.clone());
    }

    /// Counts computed from the persisted state.
    pub fn get_queue_stats(&self) -> SyncQueueResult<QueueStats> {
        let pending = self.store.list()?;
        let dead = self.store.dead_letters()?;
        Ok(QueueStats::from_items(&pending, dead.len()))
    }

    /// Pending items in delivery order.
    pub fn pending_items(&self) -> SyncQueueResult<Vec<QueueItem>> {
        let mut items = self.store.list()?;
        sort_fifo(&mut items);
        Ok(items)
    }

    pub fn dead_letters(&self) -> SyncQueueResult<Vec<QueueItem>> {
        Ok(self.store.dead_letters()?)
    }

    /// Put every dead-lettered item back in the queue with its attempts reset.
    pub fn retry_dead_letters(&self) -> SyncQueueResult<usize> {
        let count = self.store.requeue_dead_letters()?;
        info!(count, "requeued dead letters");
        Ok(count)
    }

    /// Irreversibly drop every pending item. Confirmation is the caller's job.
    pub fn clear_queue(&self) -> SyncQueueResult<usize> {
        let removed = self.store.clear()?;
        warn!(removed, "cleared offline queue");
        Ok(removed)
    }

    pub fn is_syncing(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    /// Result of the most recent completed drain pass.
    pub fn last_result(&self) -> Option<SyncResult> {
        self.last_result
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Token that stops the current drain pass after the in-flight item.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Close the transport connection, if any.
    pub async fn disconnect(&self) -> Result<(), TransportError> {
        self.transport.lock().await.disconnect().await
    }

    /// Disconnect once the caller's outcome is settled; a failure is only logged.
    pub async fn close(&self) {
        if let Err(e) = self.disconnect().await {
            debug!(error = %e, "disconnect failed");
        }
    }
}

fn validate_record_type(record_type: &str) -> SyncQueueResult<()> {
    if record_type.trim().is_empty() {
        return Err(SyncError::InvalidItem(
            "record type cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
