//! # SRDFA Reporter - Daily replication throughput collector
//!
//! Collects yesterday's SRDF/A traffic from a Unisphere for PowerMax/VMAX
//! instance and appends one total per storage group to a CSV ledger.
//!
//! ## Key Features
//!
//! - **Fixed window**: `[yesterday 00:00, today 00:00)` in local time
//! - **Array discovery**: every array and storage group Unisphere reports
//! - **Append-only ledger**: one row per storage group per run, never rewritten
//! - **Graded failures**: advisories skip an array or its remaining groups; only
//!   discovery and ledger failures abort the run
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use srdfa::{CollectionPipeline, ErrorLedger, Ledger, ReporterConfig, TimeWindow, UnisphereClient};
//!
//! let config = ReporterConfig::new("10.0.0.5:8443", "smc", "smc")?;
//! let client = UnisphereClient::new(&config)?;
//! let ledger = Ledger::new(&config.ledger_path);
//! let error_log = ErrorLedger::new(&config.error_log_path);
//!
//! let summary = CollectionPipeline::new(&client, &ledger, &error_log)
//!     .run(&TimeWindow::yesterday())?;
//! println!("{} rows written", summary.rows_written);
//! # Ok::<(), srdfa::ReporterError>(())
//! ```
//!
//! ## Modules
//!
//! - [`window`]: Collection window
//! - [`client`]: Unisphere REST calls
//! - [`aggregator`]: Series totals
//! - [`ledger`]: Daily totals ledger
//! - [`error_log`]: Fatal and skip event ledger
//! - [`pipeline`]: Collection run
//! - [`config`]: Run configuration

// Modules
pub mod aggregator;
pub mod client;
pub mod config;
pub mod error;
pub mod error_log;
pub mod ledger;
pub mod pipeline;
pub mod window;

// Re-exports for convenient access
pub use aggregator::sum_metric;
pub use client::{MetricQuery, MetricsApi, Reply, Sample, UnisphereClient, SRDFA_MB_SENT};
pub use config::{LogLevel, ReporterConfig};
pub use error::{ReporterError, Result};
pub use error_log::{ErrorLedger, Severity};
pub use ledger::{Ledger, LedgerRow, LEDGER_HEADER};
pub use pipeline::{ArrayOutcome, CollectionPipeline, RunSummary, SkipSignal, SkipTarget};
pub use window::TimeWindow;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
