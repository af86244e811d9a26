// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! A partial set of chemical readings from a single test.

use serde::{Deserialize, Serialize};

use crate::chemistry::ChemicalType;
use crate::error::{Error, Result};

/// One optional value per chemical. Absent readings are not violations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Readings {
    #[serde(default, alias = "freeChlorine", skip_serializing_if = "Option::is_none")]
    pub free_chlorine: Option<f64>,
    #[serde(default, alias = "totalChlorine", skip_serializing_if = "Option::is_none")]
    pub total_chlorine: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alkalinity: Option<f64>,
    #[serde(default, alias = "cyanuricAcid", skip_serializing_if = "Option::is_none")]
    pub cyanuric_acid: Option<f64>,
    #[serde(default, alias = "calciumHardness", skip_serializing_if = "Option::is_none")]
    pub calcium_hardness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl Readings {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, chemical: ChemicalType) -> &mut Option<f64> {
        match chemical {
            ChemicalType::FreeChlorine => &mut self.free_chlorine,
            ChemicalType::TotalChlorine => &mut self.total_chlorine,
            ChemicalType::Ph => &mut self.ph,
            ChemicalType::Alkalinity => &mut self.alkalinity,
            ChemicalType::CyanuricAcid => &mut self.cyanuric_acid,
            ChemicalType::CalciumHardness => &mut self.calcium_hardness,
            ChemicalType::Temperature => &mut self.temperature,
        }
    }

    pub fn get(&self, chemical: ChemicalType) -> Option<f64> {
        match chemical {
            ChemicalType::FreeChlorine => self.free_chlorine,
            ChemicalType::TotalChlorine => self.total_chlorine,
            ChemicalType::Ph => self.ph,
            ChemicalType::Alkalinity => self.alkalinity,
            ChemicalType::CyanuricAcid => self.cyanuric_acid,
            ChemicalType::CalciumHardness => self.calcium_hardness,
            ChemicalType::Temperature => self.temperature,
        }
    }

    pub fn set(&mut self, chemical: ChemicalType, value: f64) {
        *self.slot(chemical) = Some(value);
    }

    pub fn remove(&mut self, chemical: ChemicalType) -> Option<f64> {
        self.slot(chemical).take()
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, chemical: ChemicalType, value: f64) -> Self {
        self.set(chemical, value);
        self
    }

    /// Present readings in canonical chemical order.
    pub fn iter(&self) -> impl Iterator<Item = (ChemicalType, f64)> + '_ {
        ChemicalType::ALL
            .into_iter()
            .filter_map(move |c| self.get(c).map(|v| (c, v)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parses `name=value` pairs such as `ph=7.4` or `freeChlorine=2`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownChemical`] for an unsupported name and
    /// [`Error::InvalidReading`] for a malformed pair, a value that is not a
    /// finite number, or a chemical given twice.
    pub fn parse_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut readings = Readings::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (name, value) = pair.split_once('=').ok_or_else(|| Error::InvalidReading {
                input: pair.to_string(),
                reason: "expected name=value".to_string(),
            })?;
            let chemical: ChemicalType = name.parse()?;
            let value: f64 = value.trim().parse().map_err(|_| Error::InvalidReading {
                input: pair.to_string(),
                reason: "not a number".to_string(),
            })?;
            if !value.is_finite() {
                return Err(Error::InvalidReading {
                    input: pair.to_string(),
                    reason: "not a finite number".to_string(),
                });
            }
            if readings.get(chemical).is_some() {
                return Err(Error::InvalidReading {
                    input: pair.to_string(),
                    reason: format!("{} given more than once", chemical),
                });
            }
            readings.set(chemical, value);
        }
        Ok(readings)
    }
}

impl FromIterator<(ChemicalType, f64)> for Readings {
    fn from_iter<T: IntoIterator<Item = (ChemicalType, f64)>>(iter: T) -> Self {
        let mut readings = Readings::new();
        for (chemical, value) in iter {
            readings.set(chemical, value);
        }
        readings
    }
}

#[cfg(test)]
#[path = "readings_tests.rs"]
mod tests;
