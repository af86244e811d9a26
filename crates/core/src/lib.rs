// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! pk-core: Shared library for the poolkeep maintenance tools
//!
//! This crate provides the chemical compliance engine, the record and queue
//! item types shared by the `poolkeep` CLI and the `pk-remote` server, and
//! the durable JSONL helpers used to persist them.

pub mod chemistry;
pub mod compliance;
pub mod error;
pub mod jsonl;
pub mod protocol;
pub mod queue;
pub mod readings;
pub mod record;

pub use chemistry::{standard, ChemicalStandard, ChemicalType, Range};
pub use compliance::{
    generate_compliance_report, should_close_pool, validate_chemical, validate_named,
    ClosureDecision, ColorClasses, ComplianceReport, ComplianceStatus, Direction, Status,
    ValidationResult,
};
pub use error::{Error, Result};
pub use queue::{QueueItem, QueueStats, SyncItemError, SyncResult};
pub use readings::Readings;
pub use record::{ChemicalTest, CHEMICAL_TEST_TYPE};
