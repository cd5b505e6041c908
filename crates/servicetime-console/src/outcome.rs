//! Explicit results returned by command handlers.

use crate::exit_code::{SUCCESS, USAGE_ERROR};

/// A request from a handler to stop with a specific exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitSignal {
    code: i32,
    message: Option<String>,
}

impl ExitSignal {
    /// Builds a stop request without a user-facing message.
    #[must_use]
    pub const fn new(code: i32) -> Self {
        Self {
            code,
            message: None,
        }
    }

    /// Builds a stop request carrying a message for the operator.
    #[must_use]
    pub fn with_message(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }

    /// Exit code the handler asked for.
    #[must_use]
    pub const fn code(&self) -> i32 {
        self.code
    }

    /// Optional message to show alongside the exit.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns true when the code denotes failure.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.code != SUCCESS
    }
}

/// What a handler reports back to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The handler finished on its own and produced this exit code.
    Completed(i32),
    /// The handler asked to stop with the carried code and message.
    Stop(ExitSignal),
    /// The handler rejected its arguments.
    UsageFailure(String),
}

impl Outcome {
    /// Shorthand for a successful completion.
    #[must_use]
    pub const fn success() -> Self {
        Self::Completed(SUCCESS)
    }

    /// Exit code this outcome resolves to.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Completed(code) => *code,
            Self::Stop(signal) => signal.code(),
            Self::UsageFailure(_) => USAGE_ERROR,
        }
    }
}

impl From<ExitSignal> for Outcome {
    fn from(signal: ExitSignal) -> Self {
        Self::Stop(signal)
    }
}

/// Final result of one dispatcher invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Exit code zero; `message`, when present, goes to standard output.
    Success {
        /// Text for standard output.
        message: Option<String>,
    },
    /// Non-zero exit; `message`, when present, goes to the error stream.
    Failure {
        /// Exit code handed to the terminator.
        code: i32,
        /// Text for the error stream.
        message: Option<String>,
    },
}

impl ProcessOutcome {
    /// Builds the outcome matching `code`, routing `message` by its sign.
    #[must_use]
    pub fn from_code(code: i32, message: Option<String>) -> Self {
        if code == SUCCESS {
            Self::Success { message }
        } else {
            Self::Failure { code, message }
        }
    }

    /// Exit code of the invocation.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::Success { .. } => SUCCESS,
            Self::Failure { code, .. } => *code,
        }
    }

    /// Message attached to the outcome, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { message } | Self::Failure { message, .. } => message.as_deref(),
        }
    }
}
