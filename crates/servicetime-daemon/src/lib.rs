//! Daemon lifecycle support for servicetime commands.
//!
//! A [`Daemon`] is long-running work with explicit start, stop and cleanup
//! phases. [`DaemonCommand`] adapts it to the dispatcher's
//! [`servicetime_console::Command`] contract and drives the lifecycle
//! `Idle -> Running -> {Stopped, Failed}`:
//!
//! - the work runs once per invocation and reports an explicit outcome;
//! - the cleanup hook runs exactly once afterwards, whatever happened;
//! - interrupts arrive as messages on a [`ShutdownToken`] the work polls or
//!   waits on, never as callbacks running inside the work.
//!
//! Operating-system signals are routed to the token by a
//! [`ShutdownCoordinator`]. The first signal requests shutdown. A second
//! signal during shutdown either terminates the process immediately with
//! [`servicetime_console::exit_code::EARLY_EXIT`] or is ignored, according to
//! [`SecondSignalPolicy`].

mod command;
mod daemon;
mod errors;
mod lifecycle;
mod shutdown;
mod signals;

pub use command::DaemonCommand;
pub use daemon::{Daemon, DaemonContext};
pub use errors::LifecycleError;
pub use lifecycle::LifecycleState;
pub use shutdown::{
    SecondSignalPolicy, ShutdownCause, ShutdownCoordinator, ShutdownToken, SignalDisposition,
};
pub use signals::{InterruptGuard, InterruptSource, NoInterrupts, SystemInterrupts};

/// Tracing target for lifecycle events.
pub const LIFECYCLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::lifecycle");
