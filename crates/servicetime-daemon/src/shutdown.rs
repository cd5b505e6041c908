//! Shutdown requests delivered to running work.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use servicetime_console::Terminator;
use servicetime_console::exit_code::EARLY_EXIT;
use tracing::{info, warn};

use crate::LIFECYCLE_TARGET;

/// Why shutdown was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCause {
    /// An operating-system signal arrived.
    Signal(i32),
    /// Code inside the process asked for shutdown.
    Requested,
}

#[derive(Debug, Default)]
struct TokenState {
    cause: Mutex<Option<ShutdownCause>>,
    changed: Condvar,
}

/// Cloneable handle through which shutdown is requested and observed.
///
/// The first request wins; later requests are reported as repeats and do not
/// change the recorded cause.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    state: Arc<TokenState>,
}

impl ShutdownToken {
    /// Creates a token with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<ShutdownCause>> {
        self.state
            .cause
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Requests shutdown. Returns true only for the first request.
    pub fn request(&self, cause: ShutdownCause) -> bool {
        let mut current = self.lock();
        if current.is_some() {
            return false;
        }
        *current = Some(cause);
        self.state.changed.notify_all();
        true
    }

    /// Returns true once shutdown has been requested.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.lock().is_some()
    }

    /// Cause of the first shutdown request, if any.
    #[must_use]
    pub fn cause(&self) -> Option<ShutdownCause> {
        *self.lock()
    }

    /// Sleeps for up to `timeout`, waking early on a shutdown request.
    ///
    /// Returns true when shutdown has been requested.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self.lock();
        let (guard, _) = self
            .state
            .changed
            .wait_timeout_while(guard, timeout, |cause| cause.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        guard.is_some()
    }

    /// Blocks until shutdown is requested and returns its cause.
    pub fn wait(&self) -> ShutdownCause {
        let guard = self.lock();
        let guard = self
            .state
            .changed
            .wait_while(guard, |cause| cause.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        guard.unwrap_or(ShutdownCause::Requested)
    }
}

/// What to do with a signal that arrives while shutdown is already underway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecondSignalPolicy {
    /// Terminate immediately with the early-exit code.
    #[default]
    Terminate,
    /// Log and carry on with the graceful shutdown.
    Ignore,
}

/// How a delivered signal was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalDisposition {
    /// The signal started the graceful shutdown.
    ShutdownRequested,
    /// Shutdown was already underway and the signal was ignored.
    Ignored,
    /// Shutdown was already underway and the process was terminated.
    Terminated,
}

/// Routes signals to a [`ShutdownToken`].
#[derive(Clone)]
pub struct ShutdownCoordinator {
    token: ShutdownToken,
    policy: SecondSignalPolicy,
    terminator: Arc<dyn Terminator + Send + Sync>,
}

impl fmt::Debug for ShutdownCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownCoordinator")
            .field("token", &self.token)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ShutdownCoordinator {
    /// Builds a coordinator for `token`.
    pub fn new(
        token: ShutdownToken,
        policy: SecondSignalPolicy,
        terminator: Arc<dyn Terminator + Send + Sync>,
    ) -> Self {
        Self {
            token,
            policy,
            terminator,
        }
    }

    /// Token the coordinator signals.
    #[must_use]
    pub const fn token(&self) -> &ShutdownToken {
        &self.token
    }

    /// Handles one delivered signal.
    pub fn deliver(&self, signal: i32) -> SignalDisposition {
        if self.token.request(ShutdownCause::Signal(signal)) {
            info!(target: LIFECYCLE_TARGET, signal, "shutdown signal received");
            return SignalDisposition::ShutdownRequested;
        }
        match self.policy {
            SecondSignalPolicy::Ignore => {
                warn!(
                    target: LIFECYCLE_TARGET,
                    signal,
                    "shutdown already in progress; ignoring signal"
                );
                SignalDisposition::Ignored
            }
            SecondSignalPolicy::Terminate => {
                warn!(
                    target: LIFECYCLE_TARGET,
                    signal,
                    code = EARLY_EXIT,
                    "second shutdown signal; terminating"
                );
                self.terminator.terminate(EARLY_EXIT);
                SignalDisposition::Terminated
            }
        }
    }
}
