// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! JSONL (JSON Lines) file utilities.
//!
//! Backs the offline queue and the remote's applied-write log. Each record
//! is a single JSON line; every write is fsynced before returning.
//!
//! A final line without its newline is the remains of an append that never
//! finished. Readers skip it when it does not parse, and the next append
//! repairs it before writing.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::error::Result;

/// Appends a record to a JSONL file with fsync for durability.
pub fn append<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)?;
    repair_tail(&mut file, path)?;

    let json = serde_json::to_string(record)?;
    writeln!(file, "{json}")?;
    file.sync_all()?;

    Ok(())
}

/// Makes sure the next append starts on a fresh line.
///
/// An unterminated tail that parses is a whole record and gets its newline.
/// One that does not parse is truncated away.
fn repair_tail(file: &mut File, path: &Path) -> Result<()> {
    if file.metadata()?.len() == 0 {
        return Ok(());
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    if last[0] == b'\n' {
        return Ok(());
    }

    let mut content = Vec::new();
    file.seek(SeekFrom::Start(0))?;
    file.read_to_end(&mut content)?;
    let start = content
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);
    let tail = &content[start..];
    if serde_json::from_slice::<serde_json::Value>(tail).is_ok() {
        file.write_all(b"\n")?;
    } else {
        warn!(path = %path.display(), bytes = tail.len(), "dropping torn trailing line");
        file.set_len(start as u64)?;
    }
    Ok(())
}

/// Reads all records from a JSONL file.
///
/// Skips empty lines and returns an empty vec if the file doesn't exist.
/// An unterminated final line that does not parse is skipped with a
/// warning; any other unparseable line is an error.
pub fn read_all<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = match fs::read(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let lines: Vec<&[u8]> = content.split(|&b| b == b'\n').collect();
    let last = lines.len() - 1;
    let mut records = Vec::with_capacity(last);

    for (i, line) in lines.into_iter().enumerate() {
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        match serde_json::from_slice::<T>(line) {
            Ok(record) => records.push(record),
            // Only the last segment can lack a newline.
            Err(e) if i == last => {
                warn!(path = %path.display(), error = %e, "skipping torn trailing line");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(records)
}

/// Writes all records to a JSONL file, replacing existing content.
///
/// The records are written to a sibling temp file, fsynced, then renamed
/// over `path`, so a crash mid-write leaves either the old or the new
/// content and never a truncated file.
pub fn write_all<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let tmp = temp_path(path);
    {
        let mut file = File::create(&tmp)?;
        for record in records {
            let json = serde_json::to_string(record)?;
            writeln!(file, "{json}")?;
        }
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "jsonl_tests.rs"]
mod tests;
