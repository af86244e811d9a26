// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// The `poolkeep` binary with colors off and no inherited workspace.
pub fn pk() -> Command {
    let mut cmd = cargo_bin_cmd!("poolkeep");
    cmd.env("NO_COLOR", "1")
        .env_remove("COLOR")
        .env_remove("POOLKEEP_DIR")
        .env_remove("POOLKEEP_LOG");
    cmd
}

/// Helper to create an initialized temp directory without a remote.
pub fn init_temp() -> TempDir {
    let temp = TempDir::new().unwrap();
    pk().arg("init")
        .arg("--pool")
        .arg("main")
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

/// Helper to create an initialized temp directory pointing at `url`.
pub fn init_temp_remote(url: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    pk().arg("init")
        .arg("--pool")
        .arg("main")
        .arg("--remote")
        .arg(url)
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

/// Queue a write and return its id.
pub fn queue_add(temp: &TempDir, record_type: &str, payload: &str) -> String {
    let output = pk()
        .args(["queue", "add", record_type, payload])
        .current_dir(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    String::from_utf8_lossy(&output.stdout)
        .split_whitespace()
        .find(|s| s.starts_with("q-"))
        .unwrap()
        .to_string()
}

/// Parse a command's stdout as JSON.
pub fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}
