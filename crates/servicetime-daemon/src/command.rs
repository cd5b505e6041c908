//! Adapts a [`Daemon`] to the dispatcher's [`Command`] contract.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use servicetime_console::exit_code::{GENERAL_ERROR, SUCCESS};
use servicetime_console::{
    Command, CommandError, ExitSignal, Invocation, Outcome, OutputSink, ProcessTerminator,
    Terminator, default_help, panic_message,
};
use tracing::warn;

use crate::LIFECYCLE_TARGET;
use crate::daemon::{Daemon, DaemonContext};
use crate::lifecycle::{Lifecycle, LifecycleState};
use crate::shutdown::{SecondSignalPolicy, ShutdownCoordinator, ShutdownToken};
use crate::signals::{InterruptSource, SystemInterrupts};

/// A command that runs a [`Daemon`] through its lifecycle.
pub struct DaemonCommand<D> {
    name: String,
    about: String,
    help: Option<String>,
    daemon: D,
    interrupts: Box<dyn InterruptSource>,
    policy: SecondSignalPolicy,
    terminator: Arc<dyn Terminator + Send + Sync>,
    lifecycle: Lifecycle,
}

impl<D: Daemon> DaemonCommand<D> {
    /// Registers `daemon` under `name`, listening for the default signals.
    pub fn new(name: impl Into<String>, daemon: D) -> Self {
        Self {
            name: name.into(),
            about: String::new(),
            help: None,
            daemon,
            interrupts: Box::new(SystemInterrupts::default()),
            policy: SecondSignalPolicy::default(),
            terminator: Arc::new(ProcessTerminator),
            lifecycle: Lifecycle::default(),
        }
    }

    /// Sets the description shown in the command listing.
    #[must_use]
    pub fn with_about(mut self, about: impl Into<String>) -> Self {
        self.about = about.into();
        self
    }

    /// Replaces the generic help text.
    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Replaces the interrupt listener.
    #[must_use]
    pub fn with_interrupts<S>(mut self, interrupts: S) -> Self
    where
        S: InterruptSource + 'static,
    {
        self.interrupts = Box::new(interrupts);
        self
    }

    /// Chooses how a second signal during shutdown is handled.
    #[must_use]
    pub fn with_second_signal_policy(mut self, policy: SecondSignalPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the terminator used by [`SecondSignalPolicy::Terminate`].
    #[must_use]
    pub fn with_terminator(mut self, terminator: Arc<dyn Terminator + Send + Sync>) -> Self {
        self.terminator = terminator;
        self
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// The wrapped daemon.
    #[must_use]
    pub const fn daemon(&self) -> &D {
        &self.daemon
    }

    fn interrupted_outcome(&self) -> Outcome {
        match self.daemon.graceful_exit() {
            None => Outcome::Completed(SUCCESS),
            Some(code) => Outcome::Stop(ExitSignal::with_message(
                code,
                format!("{} interrupted; shut down early", self.name),
            )),
        }
    }

    fn work(
        &self,
        invocation: &Invocation,
        token: &ShutdownToken,
        output: &mut dyn OutputSink,
    ) -> Result<Outcome, CommandError> {
        let context = DaemonContext {
            invocation,
            shutdown: token,
            output,
        };
        match catch_unwind(AssertUnwindSafe(|| self.daemon.do_work(context))) {
            Ok(Ok(_)) if token.is_requested() => Ok(self.interrupted_outcome()),
            Ok(result) => result,
            Err(payload) => Err(CommandError::failed(format!(
                "daemon '{}' panicked: {}",
                self.name,
                panic_message(payload.as_ref())
            ))),
        }
    }

    fn finish(&self) -> Result<(), CommandError> {
        match catch_unwind(AssertUnwindSafe(|| self.daemon.on_finish())) {
            Ok(result) => result,
            Err(payload) => Err(CommandError::failed(format!(
                "cleanup panicked: {}",
                panic_message(payload.as_ref())
            ))),
        }
    }
}

impl<D: Daemon> Command for DaemonCommand<D> {
    fn name(&self) -> &str {
        &self.name
    }

    fn about(&self) -> &str {
        &self.about
    }

    fn help(&self, app_name: &str) -> String {
        self.help
            .clone()
            .unwrap_or_else(|| default_help(app_name, &self.name, &self.about))
    }

    fn run(
        &self,
        invocation: &Invocation,
        output: &mut dyn OutputSink,
    ) -> Result<Outcome, CommandError> {
        let token = ShutdownToken::new();
        let coordinator =
            ShutdownCoordinator::new(token.clone(), self.policy, Arc::clone(&self.terminator));
        let guard = self
            .interrupts
            .listen(coordinator)
            .map_err(CommandError::other)?;
        self.lifecycle
            .start(&self.name)
            .map_err(CommandError::other)?;

        let primary = self.work(invocation, &token, output);
        let cleanup = self.finish();
        drop(guard);

        match (primary, cleanup) {
            (Ok(outcome), Ok(())) => {
                self.lifecycle.stop(&self.name, outcome.exit_code());
                Ok(outcome)
            }
            (Ok(_), Err(error)) => {
                self.lifecycle.fail(&self.name, GENERAL_ERROR);
                Err(CommandError::Cleanup {
                    source: Box::new(error),
                })
            }
            (Err(error), cleanup) => {
                if let Err(cleanup_error) = cleanup {
                    warn!(
                        target: LIFECYCLE_TARGET,
                        daemon = self.name.as_str(),
                        error = %cleanup_error,
                        "cleanup failed after daemon failure"
                    );
                }
                self.lifecycle.fail(&self.name, GENERAL_ERROR);
                Err(error)
            }
        }
    }
}
