//! Entrypoint for the `servicetime` demonstration binary.
//!
//! Registers a heartbeat daemon and a greeting command, then hands the
//! process arguments to [`servicetime_console::launch`], which loads
//! configuration, initialises telemetry and dispatches with the clap back-end.

use std::process::ExitCode;

use servicetime_console::output::{self, OutputSink};
use servicetime_console::{CommandRegistry, Console, RegistryError};

mod commands;

const APP_NAME: &str = "servicetime";

fn build_console() -> Result<Console, RegistryError> {
    let registry = CommandRegistry::builder()
        .register(commands::heartbeat_command(APP_NAME))?
        .register(commands::greet_command())?
        .build();
    Ok(Console::new(APP_NAME, registry).with_about("Runs small services from the command line."))
}

fn main() -> ExitCode {
    match build_console() {
        Ok(console) => servicetime_console::launch(&console, std::env::args_os()),
        Err(error) => {
            let mut streams = output::stdio();
            // Nothing else can report the failure if stderr is gone.
            let _ = streams.write_err(&format!("Error: {error}"));
            ExitCode::FAILURE
        }
    }
}
