//! Process-wide tracing setup.
//!
//! Dispatcher and daemon events go to stderr next to operator-facing
//! messages. Stdout belongs to command output and is never written here.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::Subscriber;
use tracing_subscriber::fmt::{self, time::UtcTime};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry};

use servicetime_config::{Config, LogFormat};

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Proof that the global subscriber is in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter expression does not parse.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Another global subscriber was installed first.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(#[source] TryInitError),
}

/// Installs the global subscriber described by `config`.
///
/// Only the first successful call has any effect; later calls return a
/// handle without reading `config`.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is invalid or a subscriber was
/// installed by someone else.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED
        .get_or_try_init(|| install(config))
        .map(|_| TelemetryHandle)
}

/// Parses the configured filter expression.
pub(crate) fn build_filter(config: &Config) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(config.log_filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))
}

/// Formatting layer for `format`, writing RFC 3339 UTC timestamps to stderr.
fn format_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> tracing_subscriber::registry::LookupSpan<'span>,
{
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(!format.is_structured() && io::stderr().is_terminal())
        .with_target(true)
        .with_timer(UtcTime::rfc_3339());
    match format {
        LogFormat::Json => layer.json().flatten_event(true).boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}

fn install(config: &Config) -> Result<(), TelemetryError> {
    let filter = build_filter(config)?;
    tracing_subscriber::registry()
        .with(format_layer::<Registry>(config.log_format()))
        .with(filter)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}
