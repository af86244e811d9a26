// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use pk_core::validate_named;

use super::{print_json, print_lines};
use crate::cli::OutputFormat;
use crate::display::format_validation;
use crate::error::Result;

pub fn run(chemical: &str, value: f64, output: OutputFormat) -> Result<()> {
    let result = validate_named(value, chemical)?;
    tracing::debug!(chemical = %result.chemical, value, status = %result.status, "validated");
    match output {
        OutputFormat::Text => print_lines(&format_validation(&result)),
        OutputFormat::Json => print_json(&result)?,
    }
    Ok(())
}
