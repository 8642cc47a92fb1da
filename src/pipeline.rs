// SRDFA Reporter - Daily replication throughput collector
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Collection pipeline
//!
//! Walks arrays, then each array's storage groups, in the order Unisphere
//! returns them, and appends one ledger row per storage group.
//!
//! Advisories never abort the run. What they skip depends on where they
//! come from:
//!
//! | Call                  | Advisory / failure                        |
//! |-----------------------|-------------------------------------------|
//! | list arrays           | fatal, the run stops                      |
//! | list storage groups   | the array is skipped                      |
//! | fetch metric          | the array's remaining groups are skipped  |

use crate::aggregator::sum_metric;
use crate::client::{MetricsApi, Reply, SRDFA_MB_SENT};
use crate::error::{ReporterError, Result};
use crate::error_log::{ErrorLedger, Severity};
use crate::ledger::{Ledger, LedgerRow};
use crate::window::TimeWindow;
use std::fmt;
use tracing::{debug, error, info, warn};

/// What an advisory caused the pipeline to skip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipTarget {
    /// The whole array (storage group listing failed)
    Array { array_id: String },
    /// This storage group and every one after it in the same array
    StorageGroup {
        array_id: String,
        storage_group_id: String,
    },
}

/// A soft failure: Unisphere answered, but not with data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipSignal {
    pub message: String,
    pub target: SkipTarget,
}

impl SkipSignal {
    pub fn array(array_id: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            target: SkipTarget::Array {
                array_id: array_id.to_string(),
            },
        }
    }

    pub fn storage_group(array_id: &str, storage_group_id: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            target: SkipTarget::StorageGroup {
                array_id: array_id.to_string(),
                storage_group_id: storage_group_id.to_string(),
            },
        }
    }

    /// Array the skip applies to.
    pub fn array_id(&self) -> &str {
        match &self.target {
            SkipTarget::Array { array_id } | SkipTarget::StorageGroup { array_id, .. } => {
                array_id
            }
        }
    }
}

impl fmt::Display for SkipSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}. {} array is being skipped.",
            self.message.trim_end_matches('.'),
            self.array_id()
        )
    }
}

/// Result of collecting one array.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayOutcome {
    /// Every storage group produced a row
    Completed { rows: usize },
    /// No storage group was collected
    Skipped(SkipSignal),
    /// Collection stopped at a storage group; earlier rows were kept
    Abandoned { rows: usize, skip: SkipSignal },
}

impl ArrayOutcome {
    /// Rows written for the array.
    pub fn rows(&self) -> usize {
        match self {
            ArrayOutcome::Completed { rows } | ArrayOutcome::Abandoned { rows, .. } => *rows,
            ArrayOutcome::Skipped(_) => 0,
        }
    }

    pub fn skip(&self) -> Option<&SkipSignal> {
        match self {
            ArrayOutcome::Completed { .. } => None,
            ArrayOutcome::Skipped(skip) | ArrayOutcome::Abandoned { skip, .. } => Some(skip),
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub window: TimeWindow,
    pub arrays: usize,
    pub rows_written: usize,
    pub skips: Vec<SkipSignal>,
}

/// One collection run over a [`MetricsApi`].
pub struct CollectionPipeline<'a, A: MetricsApi> {
    api: &'a A,
    ledger: &'a Ledger,
    error_log: &'a ErrorLedger,
}

impl<'a, A: MetricsApi> CollectionPipeline<'a, A> {
    pub fn new(api: &'a A, ledger: &'a Ledger, error_log: &'a ErrorLedger) -> Self {
        Self {
            api,
            ledger,
            error_log,
        }
    }

    /// Collect every array for `window`.
    ///
    /// An error return is fatal for the run; it has already been logged and
    /// recorded in the error ledger.
    pub fn run(&self, window: &TimeWindow) -> Result<RunSummary> {
        self.collect(window).map_err(|e| {
            error!("{}", e);
            let recorded = self
                .error_log
                .ensure_initialized()
                .and_then(|_| self.error_log.record(Severity::Critical, &e.to_string()));
            if let Err(record_err) = recorded {
                error!(
                    "Could not record to {}: {}",
                    self.error_log.path().display(),
                    record_err
                );
            }
            e
        })
    }

    fn collect(&self, window: &TimeWindow) -> Result<RunSummary> {
        self.ledger.ensure_initialized()?;
        self.error_log.ensure_initialized()?;

        debug!(
            "Collecting {} from {} to {}",
            SRDFA_MB_SENT,
            window.start_millis(),
            window.end_millis()
        );

        let arrays = match self.api.list_arrays()? {
            Reply::Data(arrays) => arrays,
            Reply::Advisory(message) => return Err(ReporterError::NoArrays(message)),
        };
        info!("VMAXs found: {}", arrays.join(", "));

        let mut summary = RunSummary {
            window: *window,
            arrays: arrays.len(),
            rows_written: 0,
            skips: Vec::new(),
        };

        for array_id in &arrays {
            let outcome = self.collect_array(window, array_id)?;
            summary.rows_written += outcome.rows();

            if let Some(skip) = outcome.skip() {
                warn!("{}", skip);
                self.error_log.record(Severity::Warning, &skip.to_string())?;
                summary.skips.push(skip.clone());
            }
        }

        info!(
            "Collection complete: {} arrays, {} rows written, {} skipped",
            summary.arrays,
            summary.rows_written,
            summary.skips.len()
        );
        Ok(summary)
    }

    /// Collect every storage group of one array.
    ///
    /// Skips come back as [`ArrayOutcome`] values; only ledger writes,
    /// malformed metric data and transport failures on the metric call
    /// are errors.
    pub fn collect_array(&self, window: &TimeWindow, array_id: &str) -> Result<ArrayOutcome> {
        let groups = match self.api.list_storage_groups(array_id) {
            Ok(Reply::Data(groups)) => groups,
            Ok(Reply::Advisory(message)) => {
                return Ok(ArrayOutcome::Skipped(SkipSignal::array(array_id, message)))
            }
            Err(e) => {
                return Ok(ArrayOutcome::Skipped(SkipSignal::array(
                    array_id,
                    e.to_string(),
                )))
            }
        };
        debug!("{}: {} storage groups", array_id, groups.len());

        let mut rows = 0;
        for storage_group_id in &groups {
            let series = match self.api.fetch_metric(window, array_id, storage_group_id)? {
                Reply::Data(series) => series,
                Reply::Advisory(message) => {
                    return Ok(ArrayOutcome::Abandoned {
                        rows,
                        skip: SkipSignal::storage_group(array_id, storage_group_id, message),
                    })
                }
            };

            let row = LedgerRow {
                period: window.period(),
                array_id: array_id.to_string(),
                storage_group_id: storage_group_id.to_string(),
                total_sent: sum_metric(&series, SRDFA_MB_SENT)?,
            };

            info!(
                "Writing to file: {}, {}, {}, {}",
                row.period, row.array_id, row.storage_group_id, row.total_sent
            );
            self.ledger.append(&row)?;
            rows += 1;
        }

        Ok(ArrayOutcome::Completed { rows })
    }
}
