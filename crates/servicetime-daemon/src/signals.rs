//! Interrupt listeners feeding a [`ShutdownCoordinator`].

use std::fmt;
use std::thread::{self, JoinHandle};

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use tracing::debug;

use crate::LIFECYCLE_TARGET;
use crate::errors::LifecycleError;
use crate::shutdown::ShutdownCoordinator;

/// Installs a listener that forwards interrupts to a coordinator.
pub trait InterruptSource {
    /// Starts forwarding interrupts until the returned guard is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Install`] when the listener cannot start.
    fn listen(&self, coordinator: ShutdownCoordinator) -> Result<InterruptGuard, LifecycleError>;
}

/// Stops the listener when dropped.
#[derive(Default)]
pub struct InterruptGuard {
    handle: Option<Handle>,
    thread: Option<JoinHandle<()>>,
}

impl fmt::Debug for InterruptGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterruptGuard")
            .field("listening", &self.handle.is_some())
            .field("thread", &self.thread.is_some())
            .finish()
    }
}

impl InterruptGuard {
    /// A guard with nothing to stop.
    #[must_use]
    pub fn inert() -> Self {
        Self::default()
    }

    /// A guard that joins `thread` when dropped.
    #[must_use]
    pub fn joining(thread: JoinHandle<()>) -> Self {
        Self {
            handle: None,
            thread: Some(thread),
        }
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.close();
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                debug!(target: LIFECYCLE_TARGET, "interrupt listener thread panicked");
            }
        }
    }
}

/// Listens for process termination signals.
#[derive(Debug, Clone)]
pub struct SystemInterrupts {
    signals: Vec<i32>,
}

impl Default for SystemInterrupts {
    fn default() -> Self {
        Self {
            signals: vec![SIGTERM, SIGINT, SIGQUIT, SIGHUP],
        }
    }
}

impl SystemInterrupts {
    /// Listens for `signals` instead of the default set.
    #[must_use]
    pub fn with_signals(signals: Vec<i32>) -> Self {
        Self { signals }
    }
}

impl InterruptSource for SystemInterrupts {
    fn listen(&self, coordinator: ShutdownCoordinator) -> Result<InterruptGuard, LifecycleError> {
        let mut signals =
            Signals::new(&self.signals).map_err(|source| LifecycleError::Install { source })?;
        let handle = signals.handle();
        let thread = thread::Builder::new()
            .name(String::from("servicetime-signals"))
            .spawn(move || {
                for signal in signals.forever() {
                    coordinator.deliver(signal);
                }
            })
            .map_err(|source| LifecycleError::Install { source })?;
        debug!(target: LIFECYCLE_TARGET, signals = ?self.signals, "interrupt listener installed");
        Ok(InterruptGuard {
            handle: Some(handle),
            thread: Some(thread),
        })
    }
}

/// Never delivers interrupts.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInterrupts;

impl InterruptSource for NoInterrupts {
    fn listen(&self, _coordinator: ShutdownCoordinator) -> Result<InterruptGuard, LifecycleError> {
        Ok(InterruptGuard::inert())
    }
}
