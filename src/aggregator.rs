// SRDFA Reporter - Daily replication throughput collector
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Aggregation of a metric series into a daily total
//!
//! [`sum_metric`] adds up one named field across every sample of a series.
//! A sample without the field is an error, never a zero: a total built
//! from partial data would be written to the ledger as if it were complete.

use crate::client::Sample;
use crate::error::{ReporterError, Result};

/// Sum `field` across every sample of `series`.
///
/// An empty series sums to `0`.
pub fn sum_metric(series: &[Sample], field: &str) -> Result<f64> {
    series
        .iter()
        .enumerate()
        .try_fold(0.0, |total, (index, sample)| -> Result<f64> {
            let value = sample.get(field).ok_or_else(|| ReporterError::MissingField {
                field: field.to_string(),
                index,
            })?;

            let value = value
                .as_f64()
                .ok_or_else(|| ReporterError::NonNumericField {
                    field: field.to_string(),
                    index,
                    value: value.clone(),
                })?;

            Ok(total + value)
        })
}
