// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Full-test commands: compliance report and closure decision.

use pk_core::{generate_compliance_report, should_close_pool, Readings};

use super::{print_json, print_lines};
use crate::cli::OutputFormat;
use crate::display::{format_closure, format_report};
use crate::error::{Error, Result};

fn parse_readings(pairs: &[String]) -> Result<Readings> {
    let readings = Readings::parse_pairs(pairs)?;
    if readings.is_empty() {
        return Err(Error::NoReadings);
    }
    Ok(readings)
}

pub fn report(pairs: &[String], output: OutputFormat) -> Result<()> {
    let readings = parse_readings(pairs)?;
    let report = generate_compliance_report(&readings);
    match output {
        OutputFormat::Text => print_lines(&format_report(&report)),
        OutputFormat::Json => print_json(&report)?,
    }
    Ok(())
}

pub fn closure(pairs: &[String], output: OutputFormat) -> Result<()> {
    let readings = parse_readings(pairs)?;
    let decision = should_close_pool(&readings);
    if decision.should_close {
        tracing::warn!(reasons = decision.reasons.len(), "closure required");
    }
    match output {
        OutputFormat::Text => print_lines(&format_closure(&decision)),
        OutputFormat::Json => print_json(&decision)?,
    }
    Ok(())
}
