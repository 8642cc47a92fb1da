// SRDFA Reporter - Daily replication throughput collector
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Durable record of fatal and skip events.

use crate::error::Result;
use crate::ledger::{append_record, create_with_header};
use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Path, PathBuf};

/// Error ledger columns, in file order.
pub const ERROR_LOG_HEADER: [&str; 3] = ["Timestamp", "Severity", "Message"];

/// Severity of a recorded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Part of the run was skipped
    Warning,
    /// The run was aborted
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only CSV of `(timestamp, severity, message)` events.
#[derive(Debug, Clone)]
pub struct ErrorLedger {
    path: PathBuf,
}

impl ErrorLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with its header row unless it already exists.
    pub fn ensure_initialized(&self) -> Result<bool> {
        create_with_header(&self.path, &ERROR_LOG_HEADER)
    }

    /// Record an event stamped with the current local time.
    pub fn record(&self, severity: Severity, message: &str) -> Result<()> {
        self.record_at(Local::now(), severity, message)
    }

    /// Record an event with an explicit timestamp.
    pub fn record_at(&self, at: DateTime<Local>, severity: Severity, message: &str) -> Result<()> {
        let timestamp = at.format("%Y-%m-%d %H:%M:%S%.3f").to_string();
        append_record(&self.path, &[timestamp.as_str(), severity.as_str(), message])
    }
}
