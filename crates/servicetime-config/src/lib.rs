//! Shared configuration for the servicetime binaries.
//!
//! Configuration is layered by [`ortho_config`]: built-in defaults, then any
//! discovered configuration file, then `SERVICETIME_*` environment variables,
//! and finally command-line flags. Only the ambient concerns live here; the
//! dispatcher and daemon crates never read configuration directly.

mod defaults;
mod logging;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, default_log_filter, default_log_filter_string, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Runtime configuration shared by the servicetime binaries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "SERVICETIME")]
pub struct Config {
    /// Tracing filter expression, for example `info` or `servicetime_daemon=debug`.
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Log line encoding.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Returns the configured tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the configured log format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
