// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline write queue and its delivery to the remote store.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  SyncQueue  │────►│  Transport  │────►│  pk-remote  │
//! │  (drain)    │◄────│   (trait)   │◄────│   server    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ QueueStore  │  (queue.jsonl, dead_letter.jsonl)
//! │   (trait)   │
//! └─────────────┘
//! ```
//!
//! # Features
//!
//! - Durable JSONL queue, fsynced before `enqueue` returns
//! - Sequential FIFO drain with per-item timeouts
//! - Item ids double as idempotency keys on the wire
//! - Optional dead-lettering after a bounded number of attempts
//! - Injectable store and transport traits for testing

mod queue;
mod store;
mod transport;

pub use queue::{CancelToken, Submission, SyncConfig, SyncError, SyncQueue, SyncQueueResult};
pub use store::{DrainLease, JsonlStore, MemoryStore, QueueError, QueueResult, QueueStore};
pub use transport::{Ack, Transport, TransportError, TransportResult, WebSocketTransport, WriteRequest};

#[cfg(test)]
mod test_helpers;



#[cfg(test)]
mod store_tests;

#[cfg(test)]
mod transport_tests;
