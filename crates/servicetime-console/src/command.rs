//! Command modelling for the dispatcher.
//!
//! A [`Command`] is the unit of logic bound to a name. Handlers receive the
//! resolved [`Invocation`] and an [`OutputSink`] and report back through an
//! explicit [`Outcome`] rather than unwinding.

use crate::errors::CommandError;
use crate::outcome::Outcome;
use crate::output::OutputSink;

/// A resolved command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Command name exactly as the operator typed it.
    pub name: String,
    /// Arguments following the command name.
    pub arguments: Vec<String>,
}

impl Invocation {
    /// Builds an invocation for `name` with the trailing `arguments`.
    pub fn new<N, I, S>(name: N, arguments: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true when the only argument is a help flag.
    #[must_use]
    pub fn is_help_request(&self) -> bool {
        matches!(self.arguments.as_slice(), [flag] if flag == "--help" || flag == "-h")
    }
}

/// Renders the generic usage block for a command.
#[must_use]
pub fn default_help(app_name: &str, name: &str, about: &str) -> String {
    let usage = format!("Usage: {app_name} {name} [ARG]...");
    if about.is_empty() {
        usage
    } else {
        format!("{usage}\n\n{about}")
    }
}

/// A named unit of work the dispatcher can run.
pub trait Command {
    /// Unique name used to select the command.
    fn name(&self) -> &str;

    /// One-line description shown in the command listing.
    fn about(&self) -> &str {
        ""
    }

    /// Help text printed for `<app> <command> --help`.
    fn help(&self, app_name: &str) -> String {
        default_help(app_name, self.name(), self.about())
    }

    /// Runs the command once.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the work fails unexpectedly; the
    /// dispatcher maps it to the general-error exit code.
    fn run(
        &self,
        invocation: &Invocation,
        output: &mut dyn OutputSink,
    ) -> Result<Outcome, CommandError>;
}

/// Adapts a closure into a [`Command`].
pub struct FnCommand<F> {
    name: String,
    about: String,
    handler: F,
}

impl<F> FnCommand<F>
where
    F: Fn(&Invocation, &mut dyn OutputSink) -> Result<Outcome, CommandError>,
{
    /// Wraps `handler` under `name`.
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            about: String::new(),
            handler,
        }
    }

    /// Sets the description shown in the command listing.
    #[must_use]
    pub fn with_about(mut self, about: impl Into<String>) -> Self {
        self.about = about.into();
        self
    }
}

impl<F> Command for FnCommand<F>
where
    F: Fn(&Invocation, &mut dyn OutputSink) -> Result<Outcome, CommandError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn about(&self) -> &str {
        &self.about
    }

    fn run(
        &self,
        invocation: &Invocation,
        output: &mut dyn OutputSink,
    ) -> Result<Outcome, CommandError> {
        (self.handler)(invocation, output)
    }
}
