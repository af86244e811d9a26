// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Project configuration management.
//!
//! Configuration is stored in `.poolkeep/config.toml` and includes:
//! - `default_pool`: Pool id used by `record` when `--pool` is omitted
//! - `remote`: Optional remote store; without it every write stays queued

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env;
use crate::error::{Error, Result};
use crate::sync::SyncConfig;

const WORK_DIR_NAME: &str = ".poolkeep";
const CONFIG_FILE_NAME: &str = "config.toml";
const QUEUE_DIR_NAME: &str = "queue";
const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Project configuration stored in `.poolkeep/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Pool recorded against when a command does not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_pool: Option<String>,
    /// Remote store configuration (optional - if absent, writes stay queued).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,
}

/// Remote store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// WebSocket URL, `ws://...` or `wss://...`.
    pub url: String,
    /// Max time to wait for one write's acknowledgement in milliseconds (default: 10000).
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
    /// Max time to wait for a connection in seconds (default: 2).
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Dead-letter an item after this many failed attempts. Unset retries forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
}

fn default_send_timeout_ms() -> u64 {
    10_000
}

fn default_connect_timeout_secs() -> u64 {
    2
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>) -> Self {
        RemoteConfig {
            url: url.into(),
            send_timeout_ms: default_send_timeout_ms(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_attempts: None,
        }
    }

    /// Validates that the URL is a WebSocket URL.
    pub fn validate_url(&self) -> Result<()> {
        let rest = self
            .url
            .strip_prefix("ws://")
            .or_else(|| self.url.strip_prefix("wss://"));
        match rest {
            Some(host) if !host.is_empty() => Ok(()),
            _ => Err(Error::InvalidRemoteUrl(self.url.clone())),
        }
    }

    /// Settings for draining the queue against this remote.
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            url: self.url.clone(),
            send_timeout: Duration::from_millis(self.send_timeout_ms),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            max_attempts: self.max_attempts,
        }
    }
}

impl Config {
    pub fn load(work_dir: &Path) -> Result<Self> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        if let Some(remote) = &config.remote {
            remote.validate_url()?;
        }
        Ok(config)
    }

    pub fn save(&self, work_dir: &Path) -> Result<()> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn remote_url(&self) -> Option<&str> {
        self.remote.as_ref().map(|r| r.url.as_str())
    }

    /// Sync settings for the configured remote, or defaults without one.
    pub fn sync_config(&self) -> SyncConfig {
        match &self.remote {
            Some(remote) => remote.sync_config(),
            None => SyncConfig::default(),
        }
    }
}

/// Locate the `.poolkeep` directory.
///
/// `POOLKEEP_DIR` wins when set; otherwise the current directory and its
/// ancestors are searched.
pub fn find_work_dir() -> Result<PathBuf> {
    if let Some(dir) = env::work_dir_override() {
        if dir.is_dir() {
            return Ok(dir);
        }
        return Err(Error::NotInitialized);
    }
    find_work_dir_from(&std::env::current_dir()?)
}

/// Search `start` and its ancestors for a `.poolkeep` directory.
pub fn find_work_dir_from(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let work_dir = current.join(WORK_DIR_NAME);
        if work_dir.is_dir() {
            return Ok(work_dir);
        }
        if !current.pop() {
            return Err(Error::NotInitialized);
        }
    }
}

/// Directory holding the queue and dead-letter files.
pub fn queue_dir(work_dir: &Path) -> PathBuf {
    work_dir.join(QUEUE_DIR_NAME)
}

pub fn init_work_dir(path: &Path, config: &Config) -> Result<PathBuf> {
    let work_dir = path.join(WORK_DIR_NAME);

    if work_dir.exists() {
        return Err(Error::AlreadyInitialized(work_dir.display().to_string()));
    }
    if let Some(remote) = &config.remote {
        remote.validate_url()?;
    }

    fs::create_dir_all(queue_dir(&work_dir))?;
    config.save(&work_dir)?;
    write_gitignore(&work_dir)?;

    Ok(work_dir)
}

/// Queued writes are device-local state and never belong in version control.
pub fn write_gitignore(work_dir: &Path) -> Result<()> {
    let gitignore_path = work_dir.join(GITIGNORE_FILE_NAME);
    fs::write(&gitignore_path, "# Offline write queue (device-local)\nqueue/\n")?;
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
