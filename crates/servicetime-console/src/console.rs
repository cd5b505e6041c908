//! The dispatcher.
//!
//! [`Console`] owns the application name, the command registry and the parser
//! back-end. One call to [`Console::run`] parses argv, resolves the command,
//! runs it once and converts whatever happened into an exit code. Nothing a
//! handler does escapes as a crash: errors, usage failures and panics are all
//! caught here.

use std::any::Any;
use std::ffi::OsString;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, info, warn};

use crate::DISPATCH_TARGET;
use crate::command::{Command, Invocation};
use crate::errors::{DispatchError, UsageError};
use crate::outcome::{Outcome, ProcessOutcome};
use crate::output::{OutputSink, Stream, write_to};
use crate::parser::{AppInfo, ArgumentParser, ClapParser, ParsedArgs};
use crate::registry::CommandRegistry;
use crate::terminate::Terminator;

/// Resolves command names to handlers and turns their outcomes into exit codes.
pub struct Console {
    app: AppInfo,
    registry: CommandRegistry,
    parser: Box<dyn ArgumentParser>,
}

impl Console {
    /// Builds a dispatcher for `app_name` using the clap back-end.
    pub fn new(app_name: impl Into<String>, registry: CommandRegistry) -> Self {
        let app = AppInfo {
            name: app_name.into(),
            about: None,
            commands: registry.summaries(),
        };
        Self {
            app,
            registry,
            parser: Box::new(ClapParser),
        }
    }

    /// Swaps the argument parser back-end.
    #[must_use]
    pub fn with_parser<P>(mut self, parser: P) -> Self
    where
        P: ArgumentParser + 'static,
    {
        self.parser = Box::new(parser);
        self
    }

    /// Sets the description shown in help output.
    #[must_use]
    pub fn with_about(mut self, about: impl Into<String>) -> Self {
        self.app.about = Some(about.into());
        self
    }

    /// Application name used in usage lines.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app.name
    }

    /// Runs the command selected by `args` and returns its exit code.
    ///
    /// `args` follows the `std::env::args_os` convention. Exactly one
    /// dispatcher message (help, a stop message or an error) is written to
    /// `output` in addition to whatever the handler writes itself.
    pub fn run<I>(&self, args: I, output: &mut dyn OutputSink) -> i32
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let outcome = self.evaluate(&args, output);
        if let Some(message) = outcome.message() {
            let stream = Stream::for_code(outcome.code());
            if let Err(error) = write_to(output, stream, message) {
                warn!(
                    target: DISPATCH_TARGET,
                    %error,
                    "failed to write dispatcher output"
                );
            }
        }
        outcome.code()
    }

    /// Runs like [`Console::run`] and then hands the code to `terminator`.
    pub fn main<I>(&self, args: I, output: &mut dyn OutputSink, terminator: &dyn Terminator)
    where
        I: IntoIterator<Item = OsString>,
    {
        let code = self.run(args, output);
        terminator.terminate(code);
    }

    /// Parses, resolves and runs, returning the outcome without printing the
    /// dispatcher's own message.
    pub fn evaluate(&self, args: &[OsString], output: &mut dyn OutputSink) -> ProcessOutcome {
        match self.dispatch(args, output) {
            Ok(outcome) => outcome,
            Err(error) => {
                info!(
                    target: DISPATCH_TARGET,
                    code = error.exit_code(),
                    %error,
                    "command dispatch failed"
                );
                ProcessOutcome::Failure {
                    code: error.exit_code(),
                    message: Some(self.render_failure(&error)),
                }
            }
        }
    }

    fn dispatch(
        &self,
        args: &[OsString],
        output: &mut dyn OutputSink,
    ) -> Result<ProcessOutcome, DispatchError> {
        let invocation = match self.parser.parse(&self.app, args)? {
            ParsedArgs::Help(text) => {
                return Ok(ProcessOutcome::Success {
                    message: Some(text.trim_end().to_owned()),
                });
            }
            ParsedArgs::Bare { usage } => return Err(DispatchError::MissingCommand { usage }),
            ParsedArgs::Command(invocation) => invocation,
        };
        if invocation.name.trim().is_empty() {
            return Err(DispatchError::MissingCommand {
                usage: String::new(),
            });
        }
        let command = self.registry.resolve(&invocation.name).ok_or_else(|| {
            DispatchError::UnknownCommand {
                name: invocation.name.clone(),
            }
        })?;
        if invocation.is_help_request() {
            return Ok(ProcessOutcome::Success {
                message: Some(command.help(&self.app.name)),
            });
        }

        debug!(
            target: DISPATCH_TARGET,
            command = command.name(),
            arguments = invocation.arguments.len(),
            "running command"
        );
        match self.invoke(command, &invocation, output)? {
            Outcome::Completed(code) => Ok(ProcessOutcome::from_code(code, None)),
            Outcome::Stop(signal) => Ok(ProcessOutcome::from_code(
                signal.code(),
                signal.message().map(str::to_owned),
            )),
            Outcome::UsageFailure(message) => Err(DispatchError::Usage(UsageError::new(
                command.help(&self.app.name),
                message,
            ))),
        }
    }

    fn invoke(
        &self,
        command: &dyn Command,
        invocation: &Invocation,
        output: &mut dyn OutputSink,
    ) -> Result<Outcome, DispatchError> {
        match catch_unwind(AssertUnwindSafe(|| command.run(invocation, output))) {
            Ok(result) => result.map_err(DispatchError::from),
            Err(payload) => Err(DispatchError::Panicked {
                command: command.name().to_owned(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }

    fn render_failure(&self, error: &DispatchError) -> String {
        let hint = format!("Run '{} --help' to list available commands.", self.app.name);
        match error {
            DispatchError::MissingCommand { usage } if !usage.is_empty() => {
                UsageError::new(usage.clone(), error.to_string()).render()
            }
            DispatchError::MissingCommand { .. } | DispatchError::UnknownCommand { .. } => {
                format!("Error: {error}\n{hint}")
            }
            DispatchError::Usage(usage) => usage.render(),
            DispatchError::Command(_) | DispatchError::Panicked { .. } => {
                format!("Error: {error}")
            }
        }
    }
}

/// Extracts a printable message from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("non-string panic payload")
    }
}
