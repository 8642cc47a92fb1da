// SRDFA Reporter - Daily replication throughput collector
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # SRDFA Reporter
//!
//! Appends yesterday's SRDF/A MB-sent totals, one row per storage group, to
//! `SRDFA_Reporter.csv`. Meant to run once a day from cron or Task Scheduler.
//!
//! ## Usage
//!
//! ```bash
//! export SRUNILOCATION=10.241.209.162:8443
//! export SRUSER=smc
//! export SRPASS=smc
//! srdfa-reporter
//!
//! # Flags override the environment
//! srdfa-reporter --location 10.241.209.162:8443 --log-level DEBUG
//! ```

use clap::Parser;
use srdfa::config::{DEFAULT_ERROR_LOG_PATH, DEFAULT_LEDGER_PATH};
use srdfa::{
    CollectionPipeline, ErrorLedger, Ledger, LogLevel, ReporterConfig, ReporterError, Severity,
    TimeWindow, UnisphereClient,
};
use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// SRDF/A daily throughput reporter
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Unisphere address as IP:PORT
    #[arg(long, env = "SRUNILOCATION")]
    location: Option<String>,

    /// Unisphere username
    #[arg(long, env = "SRUSER")]
    user: Option<String>,

    /// Unisphere password
    #[arg(long, env = "SRPASS", hide_env_values = true)]
    password: Option<String>,

    /// Log level (DEBUG, INFO, WARNING, CRITICAL)
    #[arg(long, env = "SRLOGGINGLEVEL", default_value = "INFO")]
    log_level: String,

    /// Daily totals ledger
    #[arg(long, env = "SRLEDGER", default_value = DEFAULT_LEDGER_PATH)]
    ledger: PathBuf,

    /// Fatal and skip event ledger
    #[arg(long, env = "SRERRORLOG", default_value = DEFAULT_ERROR_LOG_PATH)]
    error_log: PathBuf,

    /// Per-request timeout in seconds (default: none)
    #[arg(long, env = "SRTIMEOUT")]
    timeout_secs: Option<u64>,
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("location", &self.location)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("log_level", &self.log_level)
            .field("ledger", &self.ledger)
            .field("error_log", &self.error_log)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Args {
    /// Validate the arguments into a run configuration.
    fn into_config(self) -> Result<ReporterConfig, ReporterError> {
        let location = required(self.location, "SRUNILOCATION")?;
        let user = required(self.user, "SRUSER")?;
        let password = required(self.password, "SRPASS")?;

        let mut config =
            ReporterConfig::new(location, user, password)?.with_ledgers(self.ledger, self.error_log);
        if let Some(secs) = self.timeout_secs {
            if secs == 0 {
                return Err(ReporterError::InvalidConfig(
                    "SRTIMEOUT must be at least 1 second".to_string(),
                ));
            }
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

fn required(value: Option<String>, var: &'static str) -> Result<String, ReporterError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ReporterError::MissingConfig { var })
}

/// How to fix a missing setting.
fn config_hint(var: &str) -> Option<&'static str> {
    match var {
        "SRUNILOCATION" => Some(
            "Need an IP:Port. Set SRUNILOCATION to the IP:Port of Unisphere, e.g. \
             \"export SRUNILOCATION=IP:PORT\" (Linux) or \"set SRUNILOCATION=IP:PORT\" (Windows)",
        ),
        "SRUSER" => Some(
            "Need a username. Set SRUSER to the Unisphere username, e.g. \
             \"export SRUSER=username\" (Linux) or \"set SRUSER=username\" (Windows)",
        ),
        "SRPASS" => Some(
            "Need a password. Set SRPASS to the Unisphere password, e.g. \
             \"export SRPASS=password\" (Linux) or \"set SRPASS=password\" (Windows)",
        ),
        _ => None,
    }
}

fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.as_tracing().into()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Warn about an unrecognised `SRLOGGINGLEVEL` and record it.
fn invalid_log_level(error_log: &ErrorLedger) {
    let message = format!(
        "SRLOGGINGLEVEL contains an invalid value. Valid values are: {}",
        LogLevel::VALID.join(", ")
    );
    warn!("{}", message);

    let recorded = error_log
        .ensure_initialized()
        .and_then(|_| error_log.record(Severity::Warning, &message));
    if let Err(e) = recorded {
        error!(
            "Could not record to {}: {}",
            error_log.path().display(),
            e
        );
    }
}

/// Log a fatal error raised before the pipeline starts and record it.
fn fatal(error_log: &ErrorLedger, err: &ReporterError) -> ExitCode {
    let message = match err {
        ReporterError::MissingConfig { var } => config_hint(var)
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string()),
        _ => err.to_string(),
    };
    error!("{}", message);

    let recorded = error_log
        .ensure_initialized()
        .and_then(|_| error_log.record(Severity::Critical, &message));
    if let Err(e) = recorded {
        error!(
            "Could not record to {}: {}",
            error_log.path().display(),
            e
        );
    }
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let args = Args::parse();

    let (level, valid) = LogLevel::parse_or_default(&args.log_level);
    init_tracing(level);

    let error_log = ErrorLedger::new(&args.error_log);
    if !valid {
        invalid_log_level(&error_log);
    }

    info!("SRDFA Reporter v{}", env!("CARGO_PKG_VERSION"));

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => return fatal(&error_log, &e),
    };

    let client = match UnisphereClient::new(&config) {
        Ok(client) => client,
        Err(e) => return fatal(&error_log, &e),
    };
    info!("Unisphere endpoint: {}", client.base_url());

    let ledger = Ledger::new(&config.ledger_path);
    let window = TimeWindow::yesterday();

    match CollectionPipeline::new(&client, &ledger, &error_log).run(&window) {
        Ok(summary) => {
            info!(
                "{} rows for {} written to {}",
                summary.rows_written,
                summary.window.period(),
                ledger.path().display()
            );
            ExitCode::SUCCESS
        }
        // Already logged and recorded by the pipeline
        Err(_) => ExitCode::FAILURE,
    }
}
