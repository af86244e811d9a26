// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Chemical compliance engine.
//!
//! Classifies readings against the standards table and aggregates them into
//! a facility-wide verdict. Everything here is a pure function of its
//! arguments: no state, no clock, no I/O.
//!
//! Classification of a single value, first match wins:
//!
//! 1. inside the ideal range: [`Status::Good`]
//! 2. inside `min..=max`: [`Status::Warning`]
//! 3. inside the critical band: [`Status::Critical`]
//! 4. anything else (including NaN): [`Status::Emergency`]

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::chemistry::{standard, ChemicalType};
use crate::error::{Error, Result};
use crate::readings::Readings;

/// Per-reading classification, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Good,
    Warning,
    Critical,
    Emergency,
}

/// CSS class tokens a dashboard uses to color-code a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorClasses {
    pub text: &'static str,
    pub background: &'static str,
    pub border: &'static str,
}

impl Status {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Good => "good",
            Status::Warning => "warning",
            Status::Critical => "critical",
            Status::Emergency => "emergency",
        }
    }

    pub fn color_classes(&self) -> ColorClasses {
        match self {
            Status::Good => ColorClasses {
                text: "text-green-700",
                background: "bg-green-50",
                border: "border-green-300",
            },
            Status::Warning => ColorClasses {
                text: "text-yellow-700",
                background: "bg-yellow-50",
                border: "border-yellow-300",
            },
            Status::Critical => ColorClasses {
                text: "text-orange-700",
                background: "bg-orange-50",
                border: "border-orange-400",
            },
            Status::Emergency => ColorClasses {
                text: "text-red-700",
                background: "bg-red-50",
                border: "border-red-500",
            },
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "good" => Ok(Status::Good),
            "warning" => Ok(Status::Warning),
            "critical" => Ok(Status::Critical),
            "emergency" => Ok(Status::Emergency),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// Which side of the ideal range a reading falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Low,
    High,
}

/// Outcome of validating one reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub chemical: ChemicalType,
    pub value: f64,
    pub status: Status,
    /// `None` for good readings and for values that are not numbers.
    pub direction: Option<Direction>,
    pub message: String,
    /// Corrective guidance. Always present unless the reading is good.
    pub recommendation: Option<String>,
    pub colors: ColorClasses,
}

/// Classifies a single reading.
pub fn validate_chemical(value: f64, chemical: ChemicalType) -> ValidationResult {
    let s = standard(chemical);
    let label = chemical.label();
    let unit = s.unit;
    let acceptable = s.acceptable();

    if value.is_nan() {
        return ValidationResult {
            chemical,
            value,
            status: Status::Emergency,
            direction: None,
            message: format!("{} reading is not a number", label),
            recommendation: Some(format!(
                "Retest {} before allowing swimmers",
                label.to_lowercase()
            )),
            colors: Status::Emergency.color_classes(),
        };
    }

    let direction = if value < s.ideal.min {
        Some(Direction::Low)
    } else if value > s.ideal.max {
        Some(Direction::High)
    } else {
        None
    };

    let status = if s.ideal.contains(value) {
        Status::Good
    } else if acceptable.contains(value) {
        Status::Warning
    } else if s.critical.contains(value) {
        Status::Critical
    } else {
        Status::Emergency
    };

    let (word, action) = match direction {
        Some(Direction::Low) => ("low", s.raise),
        Some(Direction::High) => ("high", s.lower),
        None => ("", ""),
    };

    let (message, recommendation) = match status {
        Status::Good => (
            format!(
                "{} is within the ideal range ({} {})",
                label, s.ideal, unit
            ),
            None,
        ),
        Status::Warning => (
            format!(
                "{} is acceptable but {} at {} {} (ideal {} {})",
                label, word, value, unit, s.ideal, unit
            ),
            Some(format!(
                "{} to bring it into the ideal range of {} {}",
                action, s.ideal, unit
            )),
        ),
        Status::Critical => (
            format!(
                "{} is critically {} at {} {} (acceptable {} {})",
                label, word, value, unit, acceptable, unit
            ),
            Some(format!(
                "{} immediately and retest before allowing swimmers",
                action
            )),
        ),
        Status::Emergency => (
            format!(
                "{} is at an emergency level: {} {} (safe limits {} {})",
                label, value, unit, s.critical, unit
            ),
            Some(format!(
                "Close the pool to swimmers. {} and retest until within {} {}",
                action, acceptable, unit
            )),
        ),
    };

    ValidationResult {
        chemical,
        value,
        status,
        direction,
        message,
        recommendation,
        colors: status.color_classes(),
    }
}

/// Classifies a reading for a chemical given by name.
///
/// # Errors
///
/// Returns [`Error::UnknownChemical`] if `chemical` is not a supported name.
pub fn validate_named(value: f64, chemical: &str) -> Result<ValidationResult> {
    let chemical: ChemicalType = chemical.parse()?;
    Ok(validate_chemical(value, chemical))
}

/// Facility-wide verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComplianceStatus {
    #[serde(rename = "compliant")]
    Compliant,
    #[serde(rename = "warning")]
    Warning,
    #[serde(rename = "non-compliant")]
    NonCompliant,
    #[serde(rename = "emergency")]
    Emergency,
}

impl ComplianceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "compliant",
            ComplianceStatus::Warning => "warning",
            ComplianceStatus::NonCompliant => "non-compliant",
            ComplianceStatus::Emergency => "emergency",
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ComplianceStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "compliant" => Ok(ComplianceStatus::Compliant),
            "warning" => Ok(ComplianceStatus::Warning),
            "non-compliant" | "non_compliant" | "noncompliant" => {
                Ok(ComplianceStatus::NonCompliant)
            }
            "emergency" => Ok(ComplianceStatus::Emergency),
            _ => Err(Error::InvalidComplianceStatus(s.to_string())),
        }
    }
}

/// Aggregate of every reading in a test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceReport {
    pub overall: ComplianceStatus,
    pub passed_tests: usize,
    pub warning_tests: usize,
    pub critical_tests: usize,
    pub emergency_tests: usize,
    /// Recommendations from critical and emergency results, in canonical order.
    pub required_actions: Vec<String>,
    /// Recommendations from warning results, in canonical order.
    pub recommendations: Vec<String>,
    pub results: Vec<ValidationResult>,
}

impl ComplianceReport {
    pub fn total_tests(&self) -> usize {
        self.passed_tests + self.warning_tests + self.critical_tests + self.emergency_tests
    }
}

/// Validates every present reading and aggregates the results.
///
/// Missing chemicals are skipped; an empty set of readings is compliant.
pub fn generate_compliance_report(readings: &Readings) -> ComplianceReport {
    let mut report = ComplianceReport {
        overall: ComplianceStatus::Compliant,
        passed_tests: 0,
        warning_tests: 0,
        critical_tests: 0,
        emergency_tests: 0,
        required_actions: Vec::new(),
        recommendations: Vec::new(),
        results: Vec::new(),
    };

    for (chemical, value) in readings.iter() {
        let result = validate_chemical(value, chemical);
        match result.status {
            Status::Good => report.passed_tests += 1,
            Status::Warning => {
                report.warning_tests += 1;
                report.recommendations.extend(result.recommendation.clone());
            }
            Status::Critical => {
                report.critical_tests += 1;
                report.required_actions.extend(result.recommendation.clone());
            }
            Status::Emergency => {
                report.emergency_tests += 1;
                report.required_actions.extend(result.recommendation.clone());
            }
        }
        report.results.push(result);
    }

    report.overall = if report.emergency_tests > 0 {
        ComplianceStatus::Emergency
    } else if report.critical_tests > 0 {
        ComplianceStatus::NonCompliant
    } else if report.warning_tests > 0 {
        ComplianceStatus::Warning
    } else {
        ComplianceStatus::Compliant
    };

    report
}

/// Whether the pool must be closed, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureDecision {
    pub should_close: bool,
    pub reasons: Vec<String>,
}

/// Decides closure: the pool closes iff any reading is at an emergency level.
pub fn should_close_pool(readings: &Readings) -> ClosureDecision {
    let reasons: Vec<String> = readings
        .iter()
        .map(|(chemical, value)| validate_chemical(value, chemical))
        .filter(|r| r.status == Status::Emergency)
        .map(|r| r.message)
        .collect();

    ClosureDecision {
        should_close: !reasons.is_empty(),
        reasons,
    }
}

#[cfg(test)]
#[path = "compliance_tests.rs"]
mod tests;
