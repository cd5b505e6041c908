//! Process termination behind an injectable capability.

use tracing::debug;

use crate::DISPATCH_TARGET;

/// Ends the process with a dispatcher exit code.
pub trait Terminator {
    /// Terminates with `code`.
    ///
    /// Production implementations never return. Test doubles record the code
    /// and return so the caller can assert on it.
    fn terminate(&self, code: i32);
}

/// Calls [`std::process::exit`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessTerminator;

impl Terminator for ProcessTerminator {
    fn terminate(&self, code: i32) {
        debug!(target: DISPATCH_TARGET, code, "terminating process");
        std::process::exit(code);
    }
}
