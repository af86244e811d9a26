// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Record a chemical test.
//!
//! The test is delivered to the remote when one is configured and reachable;
//! otherwise it lands in the offline queue under the same id.

use std::path::Path;

use chrono::Utc;
use pk_core::{ChemicalTest, Readings, Status, CHEMICAL_TEST_TYPE};
use serde_json::json;

use super::{open_queue, open_workspace, print_json, runtime};
use crate::cli::OutputFormat;
use crate::colors;
use crate::config::Config;
use crate::display::{format_submission, verdict_severity};
use crate::error::{Error, Result};
use crate::sync::Submission;

/// What the caller asked to record.
#[derive(Debug, Clone, Default)]
pub struct RecordRequest {
    pub readings: Vec<String>,
    pub pool: Option<String>,
    pub tested_by: Option<String>,
    pub notes: Option<String>,
    /// Queue without attempting delivery.
    pub offline: bool,
}

pub fn run(request: RecordRequest, output: OutputFormat) -> Result<()> {
    let (work_dir, config) = open_workspace()?;
    let (test, submission) = record_in(&work_dir, &config, request)?;

    match output {
        OutputFormat::Text => {
            println!(
                "Status: {}",
                colors::status(verdict_severity(test.status), test.status.as_str())
            );
            if test.closure_required {
                println!("{}", colors::status(Status::Emergency, "CLOSE THE POOL"));
            }
            println!("{}", format_submission(&submission));
        }
        OutputFormat::Json => {
            let (delivered, reason) = match &submission {
                Submission::Delivered { .. } => (true, None),
                Submission::Queued { reason, .. } => (false, Some(reason.as_str())),
            };
            print_json(&json!({
                "id": submission.id(),
                "delivered": delivered,
                "reason": reason,
                "record": test,
            }))?;
        }
    }
    Ok(())
}

/// Build the test record and deliver or queue it.
pub(crate) fn record_in(
    work_dir: &Path,
    config: &Config,
    request: RecordRequest,
) -> Result<(ChemicalTest, Submission)> {
    let readings = Readings::parse_pairs(&request.readings)?;
    if readings.is_empty() {
        return Err(Error::NoReadings);
    }
    let pool = request
        .pool
        .or_else(|| config.default_pool.clone())
        .ok_or(Error::NoPool)?;

    let mut test = ChemicalTest::new(pool, Utc::now(), readings)?;
    if let Some(by) = request.tested_by {
        test = test.with_tester(by);
    }
    if let Some(notes) = request.notes {
        test = test.with_notes(notes);
    }
    let payload = test.to_payload()?;
    let queue = open_queue(work_dir, config)?;

    let offline_reason = if request.offline {
        Some("offline requested")
    } else if config.remote.is_none() {
        Some("no remote configured")
    } else {
        None
    };
    if let Some(reason) = offline_reason {
        let id = queue.enqueue(CHEMICAL_TEST_TYPE, payload)?;
        return Ok((
            test,
            Submission::Queued {
                id,
                reason: reason.to_string(),
            },
        ));
    }

    let submission = runtime()?.block_on(async {
        let outcome = queue.submit(CHEMICAL_TEST_TYPE, payload).await;
        queue.close().await;
        outcome
    })?;
    Ok((test, submission))
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
