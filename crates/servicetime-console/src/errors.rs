//! Error types surfaced by the dispatcher and by command handlers.

use std::error::Error as StdError;
use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::telemetry::TelemetryError;

use crate::exit_code::{GENERAL_ERROR, UNKNOWN_COMMAND, USAGE_ERROR};

/// Unexpected failures raised by a command handler or its cleanup hook.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The handler failed and explained why.
    #[error("{message}")]
    Failed {
        /// Operator-facing description of the failure.
        message: String,
    },
    /// Writing to a stream or touching the filesystem failed.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The cleanup hook failed after the work finished.
    #[error("cleanup failed: {source}")]
    Cleanup {
        /// The error raised while cleaning up.
        #[source]
        source: Box<CommandError>,
    },
    /// Any other error raised by handler code.
    #[error(transparent)]
    Other(Box<dyn StdError + Send + Sync>),
}

impl CommandError {
    /// Builds a [`CommandError::Failed`] from a message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Wraps an arbitrary error raised by handler code.
    pub fn other<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Other(Box::new(error))
    }
}

/// Rejected arguments, already formatted by the parser back-end.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct UsageError {
    usage: String,
    message: String,
}

impl UsageError {
    /// Builds a usage error from rendered usage text and a reason.
    pub fn new(usage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            usage: usage.into(),
            message: message.into(),
        }
    }

    /// Usage text to show before the error.
    #[must_use]
    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Why the arguments were rejected.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Usage followed by the error, as written to the error stream.
    #[must_use]
    pub fn render(&self) -> String {
        let usage = self.usage.trim_end();
        if usage.is_empty() {
            format!("Error: {}", self.message)
        } else {
            format!("{usage}\n\nError: {}", self.message)
        }
    }
}

/// Failures caught at the dispatcher boundary.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No command name was supplied.
    #[error("no command supplied")]
    MissingCommand {
        /// Application usage to show before the notice; may be empty.
        usage: String,
    },
    /// The command name is not registered.
    #[error("unknown command '{name}'")]
    UnknownCommand {
        /// Name as typed by the operator.
        name: String,
    },
    /// The parser rejected the arguments.
    #[error(transparent)]
    Usage(#[from] UsageError),
    /// The handler failed unexpectedly.
    #[error(transparent)]
    Command(#[from] CommandError),
    /// The handler panicked.
    #[error("command '{command}' panicked: {message}")]
    Panicked {
        /// Registered name of the command.
        command: String,
        /// Panic payload, when it was a string.
        message: String,
    },
}

impl DispatchError {
    /// Exit code reported for this failure.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::MissingCommand { .. } | Self::UnknownCommand { .. } => UNKNOWN_COMMAND,
            Self::Usage(_) => USAGE_ERROR,
            Self::Command(_) | Self::Panicked { .. } => GENERAL_ERROR,
        }
    }
}

/// Errors raised while building a [`crate::CommandRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two commands share a name (names compare case-insensitively).
    #[error("command '{name}' is registered more than once")]
    DuplicateCommand {
        /// The clashing name.
        name: String,
    },
    /// A command was registered with a blank name.
    #[error("command names must not be blank")]
    BlankName,
}

/// Failures while preparing the process before dispatch.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// A configuration layer could not be loaded.
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    /// Telemetry could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}
