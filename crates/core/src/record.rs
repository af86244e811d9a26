// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Chemical test records submitted from the field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::compliance::{generate_compliance_report, should_close_pool, ComplianceStatus};
use crate::error::{Error, Result};
use crate::readings::Readings;

/// Record type tag used when a test is handed to the sync queue.
pub const CHEMICAL_TEST_TYPE: &str = "chemical_test";

/// A completed water test for one pool.
///
/// `status` and `closure_required` are derived from the readings at
/// construction so the stored record always agrees with the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChemicalTest {
    pub pool_id: String,
    pub tested_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tested_by: Option<String>,
    pub readings: Readings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: ComplianceStatus,
    pub closure_required: bool,
}

impl ChemicalTest {
    /// Creates a test record, deriving its status from the readings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `pool_id` is blank or no readings were taken.
    pub fn new(
        pool_id: impl Into<String>,
        tested_at: DateTime<Utc>,
        readings: Readings,
    ) -> Result<Self> {
        let pool_id = pool_id.into();
        if pool_id.trim().is_empty() {
            return Err(Error::InvalidInput("pool id cannot be empty".to_string()));
        }
        if readings.is_empty() {
            return Err(Error::InvalidInput(
                "a chemical test needs at least one reading".to_string(),
            ));
        }
        let status = generate_compliance_report(&readings).overall;
        let closure_required = should_close_pool(&readings).should_close;
        Ok(ChemicalTest {
            pool_id,
            tested_at,
            tested_by: None,
            readings,
            notes: None,
            status,
            closure_required,
        })
    }

    pub fn with_tester(mut self, tested_by: impl Into<String>) -> Self {
        self.tested_by = Some(tested_by.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Serializes the record as a queue payload.
    pub fn to_payload(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
