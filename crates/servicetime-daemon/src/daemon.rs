//! The contract implemented by long-running work.

use servicetime_console::exit_code::EARLY_EXIT;
use servicetime_console::{CommandError, Invocation, Outcome, OutputSink};

use crate::shutdown::ShutdownToken;

/// Everything the work receives for one run.
pub struct DaemonContext<'a> {
    /// The command invocation that started the daemon.
    pub invocation: &'a Invocation,
    /// Shutdown requests arrive here; long-running work must poll or wait on it.
    pub shutdown: &'a ShutdownToken,
    /// Output streams shared with the dispatcher.
    pub output: &'a mut dyn OutputSink,
}

/// Long-running work with explicit cleanup and interrupt handling.
pub trait Daemon {
    /// Performs the work until it finishes, stops itself, or observes a
    /// shutdown request on `context.shutdown`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the work fails unexpectedly.
    fn do_work(&self, context: DaemonContext<'_>) -> Result<Outcome, CommandError>;

    /// Releases resources once the work has returned.
    ///
    /// Runs exactly once per run, including after failures.
    ///
    /// # Errors
    ///
    /// A failure here turns the run into a general error.
    fn on_finish(&self) -> Result<(), CommandError> {
        Ok(())
    }

    /// Chooses the exit code after an interrupt.
    ///
    /// `None` means the daemon shut down cleanly and has no specific code to
    /// report, which maps to success.
    fn graceful_exit(&self) -> Option<i32> {
        Some(EARLY_EXIT)
    }
}
