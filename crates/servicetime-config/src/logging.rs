//! Log line encodings selectable through configuration.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// How each log event is rendered on stderr.
///
/// Parsed case-insensitively from `--log-format`, `SERVICETIME_LOG_FORMAT`
/// or the `log_format` key of a configuration file.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, fields flattened.
    Json,
    /// Terse single-line text for terminals.
    #[default]
    Compact,
}

impl LogFormat {
    /// Whether events are emitted as machine-readable records.
    #[must_use]
    pub const fn is_structured(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Returned when text names no known [`LogFormat`].
pub type LogFormatParseError = strum::ParseError;
