// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Text formatting for command output.
//!
//! Every formatter returns lines rather than printing, so commands stay thin
//! and the layout is testable.

use pk_core::{
    ChemicalType, ClosureDecision, ComplianceReport, ComplianceStatus, QueueItem, QueueStats,
    Status, SyncResult, ValidationResult,
};

use crate::colors;
use crate::sync::Submission;

/// Maximum characters of a payload shown in queue listings.
const PAYLOAD_PREVIEW: usize = 60;

/// Severity used to color a facility-wide verdict.
pub fn verdict_severity(status: ComplianceStatus) -> Status {
    match status {
        ComplianceStatus::Compliant => Status::Good,
        ComplianceStatus::Warning => Status::Warning,
        ComplianceStatus::NonCompliant => Status::Critical,
        ComplianceStatus::Emergency => Status::Emergency,
    }
}

fn status_tag(status: Status) -> String {
    colors::status(status, &format!("[{}]", status))
}

/// One validated reading.
///
/// ```text
/// [warning] pH 7.7
///   pH is acceptable but high at 7.7 pH (ideal 7.4-7.6 pH)
///   -> Add muriatic acid or sodium bisulfate to bring it into the ideal range of 7.4-7.6 pH
/// ```
pub fn format_validation(result: &ValidationResult) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} {} {}",
            status_tag(result.status),
            result.chemical.label(),
            result.value
        ),
        format!("  {}", result.message),
    ];
    if let Some(rec) = &result.recommendation {
        lines.push(format!("  -> {}", rec));
    }
    lines
}

pub fn format_report(report: &ComplianceReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Overall: {}",
        colors::status(
            verdict_severity(report.overall),
            report.overall.as_str()
        )
    )];
    lines.push(format!(
        "Tests: {} passed, {} warning, {} critical, {} emergency",
        report.passed_tests, report.warning_tests, report.critical_tests, report.emergency_tests
    ));

    if !report.results.is_empty() {
        lines.push(String::new());
        for result in &report.results {
            lines.push(format!(
                "  {} {}: {}",
                status_tag(result.status),
                result.chemical.label(),
                result.value
            ));
        }
    }

    if !report.required_actions.is_empty() {
        lines.push(String::new());
        lines.push(colors::header("Required actions:"));
        lines.extend(report.required_actions.iter().map(|a| format!("  - {}", a)));
    }
    if !report.recommendations.is_empty() {
        lines.push(String::new());
        lines.push(colors::header("Recommendations:"));
        lines.extend(report.recommendations.iter().map(|r| format!("  - {}", r)));
    }
    lines
}

pub fn format_closure(decision: &ClosureDecision) -> Vec<String> {
    if !decision.should_close {
        return vec![colors::status(Status::Good, "Pool may remain open")];
    }
    let mut lines = vec![colors::status(Status::Emergency, "CLOSE THE POOL")];
    lines.extend(decision.reasons.iter().map(|r| format!("  - {}", r)));
    lines
}

/// Range table row for one chemical.
pub fn format_range(chemical: ChemicalType) -> String {
    let s = chemical.standard();
    format!(
        "{:<18} acceptable {:<10} ideal {:<10} critical {:<10} {}",
        chemical.label(),
        s.acceptable().to_string(),
        s.ideal.to_string(),
        s.critical.to_string(),
        s.unit
    )
}

pub fn format_stats(stats: &QueueStats) -> Vec<String> {
    let mut lines = vec![format!("Pending: {}", stats.total)];
    for (record_type, count) in &stats.by_type {
        lines.push(format!("  {}: {}", record_type, count));
    }
    lines.push(format!("Dead-lettered: {}", stats.dead_lettered));
    lines
}

/// One queue item on a single line.
///
/// ```text
/// q-3f2a9c1b7d4e chemical_test 2026-10-16 09:12 attempts=2 (timed out after 10000 ms)
/// ```
pub fn format_item(item: &QueueItem) -> String {
    let mut line = format!(
        "{} {} {} attempts={}",
        item.id,
        item.record_type,
        item.created_at.format("%Y-%m-%d %H:%M"),
        item.attempts
    );
    if let Some(err) = &item.last_error {
        line.push_str(&format!(" ({})", err));
    }
    line
}

/// One queue item followed by a truncated payload preview.
pub fn format_item_detail(item: &QueueItem) -> Vec<String> {
    let payload = item.payload.to_string();
    let preview = if payload.chars().count() > PAYLOAD_PREVIEW {
        let cut: String = payload.chars().take(PAYLOAD_PREVIEW).collect();
        format!("{}...", cut)
    } else {
        payload
    };
    vec![format_item(item), format!("    {}", colors::context(&preview))]
}

pub fn format_sync_result(result: &SyncResult) -> Vec<String> {
    let mut lines = vec![format!(
        "Synced {}, failed {}",
        result.synced_items, result.failed_items
    )];
    if result.dead_lettered > 0 {
        lines.push(format!("Dead-lettered {}", result.dead_lettered));
    }
    if result.skipped_items > 0 {
        lines.push(format!("Skipped {} (cancelled)", result.skipped_items));
    }
    for err in &result.errors {
        lines.push(format!("  {}: {}", err.id, err.error));
    }
    lines
}

pub fn format_submission(submission: &Submission) -> String {
    match submission {
        Submission::Delivered { id } => format!("Delivered {}", id),
        Submission::Queued { id, reason } => format!("Queued {} ({})", id, reason),
    }
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
