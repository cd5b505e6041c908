use crate::logging::LogFormat;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binaries.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Default logging format for the binaries.
///
/// Console tools write logs next to user-facing stderr text, so the compact
/// encoding is the default; JSON is opt-in.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
