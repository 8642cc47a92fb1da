// SRDFA Reporter - Daily replication throughput collector
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Append-only CSV ledger of daily totals
//!
//! The file is created with its header on first use and only ever appended
//! to afterwards. Each row is written through its own open/flush/close, so
//! a run that fails halfway keeps every row it already wrote.

use crate::error::Result;
use chrono::NaiveDate;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Ledger columns, in file order.
pub const LEDGER_HEADER: [&str; 4] = [
    "24h Period",
    "Array",
    "Storage Group",
    "Total MB Sent by SRDFA",
];

/// One storage group's total for one day.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub period: NaiveDate,
    pub array_id: String,
    pub storage_group_id: String,
    pub total_sent: f64,
}

impl LedgerRow {
    /// Totals use `f64`'s `Display`: whole values have no fraction
    /// (`120`, not `120.0`) and `0` is written as `0`.
    fn to_record(&self) -> [String; 4] {
        [
            self.period.to_string(),
            self.array_id.clone(),
            self.storage_group_id.clone(),
            self.total_sent.to_string(),
        ]
    }
}

/// The daily totals ledger file.
#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with its header row unless it already exists.
    ///
    /// Only existence is checked: an existing file is accepted as-is, header
    /// or not. Returns `true` when the file was created.
    pub fn ensure_initialized(&self) -> Result<bool> {
        create_with_header(&self.path, &LEDGER_HEADER)
    }

    /// Append one row.
    pub fn append(&self, row: &LedgerRow) -> Result<()> {
        append_record(&self.path, row.to_record().as_slice())
    }
}

/// Create `path` holding only `header`; leave an existing file untouched.
pub(crate) fn create_with_header(path: &Path, header: &[&str]) -> Result<bool> {
    let file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(e.into()),
    };

    write_record(file, header)?;
    Ok(true)
}

/// Append one record to `path`, creating the file if needed.
pub(crate) fn append_record<S: AsRef<[u8]>>(path: &Path, record: &[S]) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    write_record(file, record)
}

fn write_record<S: AsRef<[u8]>>(file: File, record: &[S]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(record)?;
    writer.flush()?;
    Ok(())
}
