// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::{Path, PathBuf};

use crate::config::{init_work_dir, Config, RemoteConfig};
use crate::error::Result;

pub fn run(remote: Option<String>, pool: Option<String>, path: Option<String>) -> Result<()> {
    let target_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir()?,
    };
    let (work_dir, config) = init_at(&target_path, remote, pool)?;

    println!("Initialized poolkeep at {}", work_dir.display());
    match config.remote_url() {
        Some(url) => println!("Remote: {}", url),
        None => println!("Remote: none (writes stay queued until one is configured)"),
    }
    if let Some(pool) = &config.default_pool {
        println!("Default pool: {}", pool);
    }
    Ok(())
}

pub(crate) fn init_at(
    target_path: &Path,
    remote: Option<String>,
    pool: Option<String>,
) -> Result<(PathBuf, Config)> {
    let config = Config {
        default_pool: pool,
        remote: remote.map(RemoteConfig::new),
    };
    let work_dir = init_work_dir(target_path, &config)?;
    tracing::info!(path = %work_dir.display(), "initialized");
    Ok((work_dir, config))
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
