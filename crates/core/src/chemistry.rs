// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Chemical parameters and the MAHC-style standards table.
//!
//! Every supported chemical has exactly one [`ChemicalStandard`], defined at
//! compile time and never mutated. Classification and display both read the
//! same table, so the ranges shown to an operator are the ranges used to
//! judge a reading.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A chemical (or physical) parameter measured during a pool test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChemicalType {
    /// Free available chlorine.
    FreeChlorine,
    /// Free plus combined chlorine.
    TotalChlorine,
    /// Acidity / basicity.
    Ph,
    /// Total alkalinity, the pH buffer.
    Alkalinity,
    /// Cyanuric acid (chlorine stabilizer).
    CyanuricAcid,
    /// Calcium hardness.
    CalciumHardness,
    /// Water temperature in degrees Fahrenheit.
    Temperature,
}

impl ChemicalType {
    /// Canonical evaluation order. Reports, closure reasons and readings
    /// iteration all follow this order.
    pub const ALL: [ChemicalType; 7] = [
        ChemicalType::FreeChlorine,
        ChemicalType::TotalChlorine,
        ChemicalType::Ph,
        ChemicalType::Alkalinity,
        ChemicalType::CyanuricAcid,
        ChemicalType::CalciumHardness,
        ChemicalType::Temperature,
    ];

    /// Returns the string representation used in storage and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChemicalType::FreeChlorine => "free_chlorine",
            ChemicalType::TotalChlorine => "total_chlorine",
            ChemicalType::Ph => "ph",
            ChemicalType::Alkalinity => "alkalinity",
            ChemicalType::CyanuricAcid => "cyanuric_acid",
            ChemicalType::CalciumHardness => "calcium_hardness",
            ChemicalType::Temperature => "temperature",
        }
    }

    /// Returns the human-readable name used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            ChemicalType::FreeChlorine => "Free chlorine",
            ChemicalType::TotalChlorine => "Total chlorine",
            ChemicalType::Ph => "pH",
            ChemicalType::Alkalinity => "Alkalinity",
            ChemicalType::CyanuricAcid => "Cyanuric acid",
            ChemicalType::CalciumHardness => "Calcium hardness",
            ChemicalType::Temperature => "Temperature",
        }
    }

    /// Returns the standard this chemical is judged against.
    pub fn standard(&self) -> &'static ChemicalStandard {
        standard(*self)
    }
}

impl fmt::Display for ChemicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChemicalType {
    type Err = Error;

    /// Accepts snake_case, kebab-case and camelCase spellings, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "freechlorine" | "fc" => Ok(ChemicalType::FreeChlorine),
            "totalchlorine" | "tc" => Ok(ChemicalType::TotalChlorine),
            "ph" => Ok(ChemicalType::Ph),
            "alkalinity" | "totalalkalinity" | "ta" => Ok(ChemicalType::Alkalinity),
            "cyanuricacid" | "cya" => Ok(ChemicalType::CyanuricAcid),
            "calciumhardness" | "ch" => Ok(ChemicalType::CalciumHardness),
            "temperature" | "temp" => Ok(ChemicalType::Temperature),
            _ => Err(Error::UnknownChemical(s.to_string())),
        }
    }
}

/// An inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Range { min, max }
    }

    /// True if `value` lies within `min..=max`. Never true for NaN.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// True if `other` lies entirely within this range.
    pub fn encloses(&self, other: &Range) -> bool {
        self.min <= other.min && other.max <= self.max
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// Regulatory thresholds for a single chemical.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChemicalStandard {
    /// Lowest acceptable value.
    pub min: f64,
    /// Highest acceptable value.
    pub max: f64,
    /// Target range.
    pub ideal: Range,
    /// Outside `min..=max` but inside this band is critical; beyond it is an emergency.
    pub critical: Range,
    /// Display unit.
    pub unit: &'static str,
    /// Corrective action when the value is too low.
    pub raise: &'static str,
    /// Corrective action when the value is too high.
    pub lower: &'static str,
}

impl ChemicalStandard {
    /// The acceptable (`min..=max`) range.
    pub fn acceptable(&self) -> Range {
        Range::new(self.min, self.max)
    }
}

static FREE_CHLORINE: ChemicalStandard = ChemicalStandard {
    min: 1.0,
    max: 10.0,
    ideal: Range::new(2.0, 4.0),
    critical: Range::new(0.3, 15.0),
    unit: "ppm",
    raise: "Add chlorine (liquid or granular hypochlorite)",
    lower: "Stop chlorine feed and allow levels to fall, or add a dechlorinator",
};

static TOTAL_CHLORINE: ChemicalStandard = ChemicalStandard {
    min: 1.0,
    max: 10.0,
    ideal: Range::new(2.0, 4.0),
    critical: Range::new(0.3, 15.0),
    unit: "ppm",
    raise: "Add chlorine (liquid or granular hypochlorite)",
    lower: "Stop chlorine feed and superchlorinate to break down combined chlorine",
};

static PH: ChemicalStandard = ChemicalStandard {
    min: 7.2,
    max: 7.8,
    ideal: Range::new(7.4, 7.6),
    critical: Range::new(6.5, 8.0),
    unit: "pH",
    raise: "Add sodium carbonate (soda ash)",
    lower: "Add muriatic acid or sodium bisulfate",
};

static ALKALINITY: ChemicalStandard = ChemicalStandard {
    min: 60.0,
    max: 180.0,
    ideal: Range::new(80.0, 120.0),
    critical: Range::new(40.0, 240.0),
    unit: "ppm",
    raise: "Add sodium bicarbonate",
    lower: "Add muriatic acid in small doses and aerate",
};

static CYANURIC_ACID: ChemicalStandard = ChemicalStandard {
    min: 0.0,
    max: 90.0,
    ideal: Range::new(30.0, 50.0),
    critical: Range::new(0.0, 100.0),
    unit: "ppm",
    raise: "Add cyanuric acid stabilizer",
    lower: "Partially drain and refill with fresh water",
};

static CALCIUM_HARDNESS: ChemicalStandard = ChemicalStandard {
    min: 150.0,
    max: 1000.0,
    ideal: Range::new(200.0, 400.0),
    critical: Range::new(100.0, 1200.0),
    unit: "ppm",
    raise: "Add calcium chloride",
    lower: "Partially drain and refill with softer water",
};

static TEMPERATURE: ChemicalStandard = ChemicalStandard {
    min: 68.0,
    max: 104.0,
    ideal: Range::new(78.0, 82.0),
    critical: Range::new(60.0, 106.0),
    unit: "°F",
    raise: "Increase heater set point",
    lower: "Reduce heater set point",
};

/// Returns the standard for a chemical.
pub fn standard(chemical: ChemicalType) -> &'static ChemicalStandard {
    match chemical {
        ChemicalType::FreeChlorine => &FREE_CHLORINE,
        ChemicalType::TotalChlorine => &TOTAL_CHLORINE,
        ChemicalType::Ph => &PH,
        ChemicalType::Alkalinity => &ALKALINITY,
        ChemicalType::CyanuricAcid => &CYANURIC_ACID,
        ChemicalType::CalciumHardness => &CALCIUM_HARDNESS,
        ChemicalType::Temperature => &TEMPERATURE,
    }
}

/// The acceptable range used for classification.
pub fn acceptable_range(chemical: ChemicalType) -> Range {
    standard(chemical).acceptable()
}

/// The ideal range used for classification.
pub fn ideal_range(chemical: ChemicalType) -> Range {
    standard(chemical).ideal
}

/// The critical band used for classification.
pub fn critical_range(chemical: ChemicalType) -> Range {
    standard(chemical).critical
}

#[cfg(test)]
#[path = "chemistry_tests.rs"]
mod tests;
