// SRDFA Reporter - Daily replication throughput collector
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Configuration types for the collector

use crate::error::{ReporterError, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default ledger file, relative to the working directory.
pub const DEFAULT_LEDGER_PATH: &str = "SRDFA_Reporter.csv";

/// Default error ledger file, relative to the working directory.
pub const DEFAULT_ERROR_LOG_PATH: &str = "SRDFA_Reporter_Error_Log.csv";

/// Path of the Unisphere REST API below `host:port`.
pub const REST_API_PATH: &str = "/univmax/restapi";

/// Resolved settings for one run.
///
/// Built once at startup and handed to the client and ledgers; nothing in
/// the library reads the process environment. `Debug` output masks the
/// password.
#[derive(Clone)]
pub struct ReporterConfig {
    /// REST API root, e.g. `https://10.0.0.5:8443/univmax/restapi`
    pub base_url: String,

    /// Unisphere username (HTTP basic auth)
    pub username: String,

    /// Unisphere password (HTTP basic auth)
    pub password: String,

    /// Per-request timeout (default: none)
    pub request_timeout: Option<Duration>,

    /// Daily totals ledger
    pub ledger_path: PathBuf,

    /// Fatal and skip event ledger
    pub error_log_path: PathBuf,
}

impl ReporterConfig {
    /// Create a configuration for a Unisphere instance at `host:port`.
    pub fn new(
        location: impl AsRef<str>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let location = location.as_ref().trim().trim_end_matches('/');
        if location.is_empty() {
            return Err(ReporterError::MissingConfig {
                var: "SRUNILOCATION",
            });
        }
        if location.contains("://") {
            return Err(ReporterError::InvalidConfig(format!(
                "SRUNILOCATION must be IP:PORT without a scheme, got {location}"
            )));
        }
        Ok(Self::with_base_url(
            format!("https://{location}{REST_API_PATH}"),
            username,
            password,
        ))
    }

    /// Create a configuration against an explicit REST API root.
    pub fn with_base_url(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            request_timeout: None,
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
            error_log_path: PathBuf::from(DEFAULT_ERROR_LOG_PATH),
        }
    }

    /// Set the ledger paths
    pub fn with_ledgers(
        mut self,
        ledger_path: impl Into<PathBuf>,
        error_log_path: impl Into<PathBuf>,
    ) -> Self {
        self.ledger_path = ledger_path.into();
        self.error_log_path = error_log_path.into();
        self
    }

    /// Set a per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

impl fmt::Debug for ReporterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReporterConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("request_timeout", &self.request_timeout)
            .field("ledger_path", &self.ledger_path)
            .field("error_log_path", &self.error_log_path)
            .finish()
    }
}

/// Verbosity accepted in `SRLOGGINGLEVEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Critical,
}

impl LogLevel {
    /// Valid spellings, for diagnostics.
    pub const VALID: [&'static str; 4] = ["DEBUG", "INFO", "WARNING", "CRITICAL"];

    /// Parse a level, falling back to [`LogLevel::Info`].
    ///
    /// The flag is `false` when the input was not recognised.
    pub fn parse_or_default(value: &str) -> (Self, bool) {
        match value.parse() {
            Ok(level) => (level, true),
            Err(_) => (Self::default(), false),
        }
    }

    /// Equivalent `tracing` level.
    pub fn as_tracing(self) -> tracing::Level {
        match self {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warning => tracing::Level::WARN,
            LogLevel::Critical => tracing::Level::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ReporterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" => Ok(LogLevel::Warning),
            "CRITICAL" => Ok(LogLevel::Critical),
            other => Err(ReporterError::InvalidConfig(format!(
                "SRLOGGINGLEVEL contains an invalid value: {other}"
            ))),
        }
    }
}
