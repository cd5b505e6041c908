//! Errors raised by the daemon lifecycle adapter.

use std::io;

use thiserror::Error;

/// Errors raised while driving a daemon lifecycle.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The daemon was started again while still running.
    #[error("daemon '{name}' is already running")]
    AlreadyRunning {
        /// Registered command name of the daemon.
        name: String,
    },
    /// Installing the interrupt listener failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}
