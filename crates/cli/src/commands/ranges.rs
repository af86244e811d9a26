// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use pk_core::{ChemicalType, Range};
use serde::Serialize;

use super::print_json;
use crate::cli::OutputFormat;
use crate::display::format_range;
use crate::error::Result;

#[derive(Debug, Serialize)]
struct RangeRow {
    chemical: ChemicalType,
    unit: &'static str,
    acceptable: Range,
    ideal: Range,
    critical: Range,
}

impl From<ChemicalType> for RangeRow {
    fn from(chemical: ChemicalType) -> Self {
        let s = chemical.standard();
        RangeRow {
            chemical,
            unit: s.unit,
            acceptable: s.acceptable(),
            ideal: s.ideal,
            critical: s.critical,
        }
    }
}

/// Chemicals to show: one by name, or all in canonical order.
fn selected(chemical: Option<&str>) -> Result<Vec<ChemicalType>> {
    match chemical {
        Some(name) => Ok(vec![name.parse()?]),
        None => Ok(ChemicalType::ALL.to_vec()),
    }
}

pub fn run(chemical: Option<&str>, output: OutputFormat) -> Result<()> {
    let chemicals = selected(chemical)?;
    match output {
        OutputFormat::Text => {
            for chemical in chemicals {
                println!("{}", format_range(chemical));
            }
        }
        OutputFormat::Json => {
            let rows: Vec<RangeRow> = chemicals.into_iter().map(RangeRow::from).collect();
            print_json(&rows)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "ranges_tests.rs"]
mod tests;
