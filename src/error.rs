// SRDFA Reporter - Daily replication throughput collector
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for the collector
//!
//! Advisory messages returned by Unisphere are not errors; they travel as
//! [`Reply::Advisory`](crate::client::Reply) values. Everything here ends
//! the run when it reaches the top of the pipeline.

use thiserror::Error;

/// Result type alias for collector operations
pub type Result<T> = std::result::Result<T, ReporterError>;

/// Main error type for collector operations
#[derive(Error, Debug)]
pub enum ReporterError {
    /// Required setting was not provided
    #[error("Missing configuration: {var} is not set")]
    MissingConfig { var: &'static str },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unisphere reported no arrays (or refused to list them)
    #[error("Array discovery failed: {0}")]
    NoArrays(String),

    /// Unisphere answered the array listing with something other than JSON
    #[error("Login failure (HTTP {status}): check the configured username and password")]
    LoginFailed { status: u16 },

    /// Unisphere could not be reached
    #[error("Unisphere couldn't be reached: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body was not the expected shape
    #[error("Malformed response from {endpoint}: {source}")]
    MalformedResponse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// Metric sample without the requested field
    #[error("Sample {index} has no {field} value")]
    MissingField { field: String, index: usize },

    /// Metric sample with a value that is not a number
    #[error("Sample {index} has a non-numeric {field} value: {value}")]
    NonNumericField {
        field: String,
        index: usize,
        value: serde_json::Value,
    },

    /// Ledger write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
