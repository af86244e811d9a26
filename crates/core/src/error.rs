// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for pk-core operations.

use thiserror::Error;

/// All possible errors that can occur in pk-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown chemical: '{0}'\n  hint: valid chemicals are: free_chlorine, total_chlorine, ph, alkalinity, cyanuric_acid, calcium_hardness, temperature")]
    UnknownChemical(String),

    #[error("invalid reading '{input}': {reason}\n  hint: readings are written as name=value, e.g. ph=7.4")]
    InvalidReading { input: String, reason: String },

    #[error("invalid status: '{0}'\n  hint: valid statuses are: good, warning, critical, emergency")]
    InvalidStatus(String),

    #[error("invalid compliance status: '{0}'\n  hint: valid values are: compliant, warning, non-compliant, emergency")]
    InvalidComplianceStatus(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for pk-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
