// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::{QueueError, SyncError};

/// All possible errors that can occur in the pkrs library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'poolkeep init' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("no remote configured\n  hint: set [remote] url in .poolkeep/config.toml or run 'poolkeep init --remote <url>'")]
    NoRemote,

    #[error("invalid remote URL '{0}'\n  hint: use ws://host:port or wss://host:port")]
    InvalidRemoteUrl(String),

    #[error("no pool given\n  hint: pass --pool or set default_pool in .poolkeep/config.toml")]
    NoPool,

    #[error("no readings given\n  hint: pass readings as name=value, e.g. ph=7.4 fc=2.5")]
    NoReadings,

    #[error("invalid JSON payload: {0}")]
    InvalidPayload(String),

    #[error("refusing to clear {count} queued item(s) without --yes")]
    ConfirmationRequired { count: usize },

    #[error("sync incomplete: {synced} synced, {failed} failed")]
    SyncIncomplete { synced: usize, failed: usize },

    #[error(transparent)]
    Core(#[from] pk_core::Error),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

/// A specialized Result type for pkrs operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
