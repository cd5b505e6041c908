//! Lifecycle phases of a daemon command.
//!
//! A command starts `Idle`, is `Running` while its work executes, and ends
//! `Stopped` or `Failed` with the code it reported. A finished command may
//! run again.

use std::cell::Cell;

use tracing::{debug, info, warn};

use crate::LIFECYCLE_TARGET;
use crate::errors::LifecycleError;

/// Phase of a daemon run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Not started yet.
    #[default]
    Idle,
    /// `do_work` is executing.
    Running,
    /// Finished normally, by request, or after an interrupt.
    Stopped(i32),
    /// The work or its cleanup failed.
    Failed(i32),
}

impl LifecycleState {
    /// Exit code of a terminal state.
    #[must_use]
    pub const fn exit_code(self) -> Option<i32> {
        match self {
            Self::Idle | Self::Running => None,
            Self::Stopped(code) | Self::Failed(code) => Some(code),
        }
    }
}

/// Tracks the state of a single daemon command.
#[derive(Debug, Default)]
pub(crate) struct Lifecycle {
    state: Cell<LifecycleState>,
}

impl Lifecycle {
    pub(crate) fn state(&self) -> LifecycleState {
        self.state.get()
    }

    /// Moves to `Running`; terminal states from an earlier run are reset.
    pub(crate) fn start(&self, name: &str) -> Result<(), LifecycleError> {
        if self.state() == LifecycleState::Running {
            return Err(LifecycleError::AlreadyRunning {
                name: name.to_owned(),
            });
        }
        self.state.set(LifecycleState::Running);
        debug!(target: LIFECYCLE_TARGET, daemon = name, "daemon running");
        Ok(())
    }

    pub(crate) fn stop(&self, name: &str, code: i32) {
        self.state.set(LifecycleState::Stopped(code));
        info!(target: LIFECYCLE_TARGET, daemon = name, code, "daemon stopped");
    }

    pub(crate) fn fail(&self, name: &str, code: i32) {
        self.state.set(LifecycleState::Failed(code));
        warn!(target: LIFECYCLE_TARGET, daemon = name, code, "daemon failed");
    }
}
