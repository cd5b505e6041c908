//! Command dispatch for servicetime binaries.
//!
//! The crate owns argument parsing, command resolution, and the mapping from
//! handler outcomes to process exit codes. It is designed to be exercised both
//! from a binary entrypoint and from tests where the parser, the output
//! streams, configuration loading and process termination can all be
//! substituted.
//!
//! ```rust,ignore
//! let registry = CommandRegistry::builder()
//!     .register(FnCommand::new("greet", |_, out| {
//!         out.write_out("hello")?;
//!         Ok(Outcome::success())
//!     }))?
//!     .build();
//! let console = Console::new("app", registry);
//! let code = console.run(std::env::args_os(), &mut output::stdio());
//! ```

use std::ffi::OsString;
use std::process::ExitCode;

use tracing::{debug, warn};

mod command;
mod config;
mod console;
mod errors;
pub mod exit_code;
mod outcome;
pub mod output;
pub mod parser;
mod registry;
pub mod telemetry;
mod terminate;

pub use command::{Command, FnCommand, Invocation, default_help};
pub use config::{ConfigLoader, OrthoConfigLoader, StaticConfigLoader};
pub use console::{Console, panic_message};
pub use errors::{CommandError, DispatchError, LaunchError, RegistryError, UsageError};
pub use outcome::{ExitSignal, Outcome, ProcessOutcome};
pub use output::{OutputSink, StreamSink};
pub use parser::{AppInfo, ArghParser, ArgumentParser, ClapParser, ParsedArgs};
pub use registry::{CommandRegistry, CommandSummary, RegistryBuilder};
pub use terminate::{ProcessTerminator, Terminator};

use config::split_config_arguments;

/// Tracing target for dispatcher events.
pub const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Runs `console` as the process entrypoint.
///
/// Loads layered configuration from the leading flags, initialises telemetry,
/// dispatches the remaining arguments against the process streams and returns
/// the matching [`ExitCode`].
#[must_use]
pub fn launch<I>(console: &Console, args: I) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
{
    let mut output = output::stdio();
    exit_code::to_process_exit(launch_with_loader(
        console,
        args,
        &mut output,
        &OrthoConfigLoader,
    ))
}

/// Runs `console` with a custom configuration loader and output sink.
///
/// Returns the dispatcher exit code. Launch failures are written to the error
/// stream and reported as [`exit_code::GENERAL_ERROR`].
pub fn launch_with_loader<I, L>(
    console: &Console,
    args: I,
    output: &mut dyn OutputSink,
    loader: &L,
) -> i32
where
    I: IntoIterator<Item = OsString>,
    L: ConfigLoader + ?Sized,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);
    let prepared = loader
        .load(&split.config_arguments)
        .and_then(|config| telemetry::initialise(&config).map_err(LaunchError::from));

    match prepared {
        Ok(_handle) => {
            debug!(
                target: DISPATCH_TARGET,
                app = console.app_name(),
                "configuration loaded"
            );
            console.run(split.command_arguments, output)
        }
        Err(error) => {
            if let Err(write_error) = output.write_err(&format!("Error: {error}")) {
                warn!(
                    target: DISPATCH_TARGET,
                    error = %write_error,
                    "failed to report launch failure"
                );
            }
            exit_code::GENERAL_ERROR
        }
    }
}
