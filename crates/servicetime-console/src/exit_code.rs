//! Exit codes selected by the dispatcher.
//!
//!   0   = success (including help output)
//!   1   = general error (handler failure, cleanup failure, panic)
//!   2   = usage error
//!   -1  = no command supplied, or the command is not registered
//!   130 = daemon stopped early by an interrupt it did not handle itself

use std::process::ExitCode;

/// The command completed successfully.
pub const SUCCESS: i32 = 0;
/// A handler or cleanup hook failed unexpectedly.
pub const GENERAL_ERROR: i32 = 1;
/// Arguments were rejected by the parser or by the handler.
pub const USAGE_ERROR: i32 = 2;
/// No command was supplied, or the supplied name is not registered.
pub const UNKNOWN_COMMAND: i32 = -1;
/// A daemon was interrupted and did not supply its own exit code.
pub const EARLY_EXIT: i32 = 130;

/// Converts a dispatcher exit code into a process [`ExitCode`].
///
/// Codes within `0..=255` pass through unchanged. Other codes keep their low
/// byte the way POSIX `exit(3)` truncates them, so [`UNKNOWN_COMMAND`] becomes
/// `255`. A non-zero code that would truncate to zero maps to failure instead
/// of reporting success.
#[must_use]
pub fn to_process_exit(code: i32) -> ExitCode {
    let low_byte = code.to_le_bytes()[0];
    if code != SUCCESS && low_byte == 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::from(low_byte)
    }
}
