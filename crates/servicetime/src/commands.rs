//! Commands shipped with the demonstration binary.

use std::time::Duration;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use servicetime_console::exit_code::SUCCESS;
use servicetime_console::{
    Command, CommandError, ExitSignal, FnCommand, Invocation, Outcome, OutputSink,
};
use servicetime_daemon::{Daemon, DaemonCommand, DaemonContext};
use tracing::info;

const HEARTBEAT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::heartbeat");
const DEFAULT_INTERVAL_MS: u64 = 1_000;

/// Arguments accepted by the `daemon` command.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "daemon", about = "Runs a heartbeat until interrupted.")]
pub(crate) struct HeartbeatArgs {
    /// Stop after this many heartbeats instead of waiting for an interrupt.
    #[arg(long, value_name = "N")]
    pub(crate) ticks: Option<u64>,
    /// Milliseconds between heartbeats.
    #[arg(
        long = "interval-ms",
        value_name = "MS",
        default_value_t = DEFAULT_INTERVAL_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub(crate) interval_ms: u64,
}

impl HeartbeatArgs {
    /// Parses the command arguments, or returns the outcome that reports why
    /// they were rejected.
    fn parse_arguments(arguments: &[String]) -> Result<Self, Outcome> {
        let argv = std::iter::once("daemon").chain(arguments.iter().map(String::as_str));
        Self::try_parse_from(argv).map_err(|error| match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Outcome::Stop(
                ExitSignal::with_message(SUCCESS, error.to_string().trim_end().to_owned()),
            ),
            _ => Outcome::UsageFailure(usage_message(&error)),
        })
    }

    fn finished(&self, beats: u64) -> bool {
        self.ticks.is_some_and(|limit| beats >= limit)
    }
}

/// First line of a clap error without its `error:` prefix.
fn usage_message(error: &clap::Error) -> String {
    let rendered = error.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_owned()
}

/// Pretends to be a service by logging a heartbeat on a fixed interval.
#[derive(Debug, Default)]
pub(crate) struct Heartbeat;

impl Daemon for Heartbeat {
    fn do_work(&self, context: DaemonContext<'_>) -> Result<Outcome, CommandError> {
        let args = match HeartbeatArgs::parse_arguments(&context.invocation.arguments) {
            Ok(args) => args,
            Err(outcome) => return Ok(outcome),
        };
        context.output.write_out("Let's pretend a daemon is running!")?;

        let interval = Duration::from_millis(args.interval_ms);
        let mut beats: u64 = 0;
        while !args.finished(beats) {
            if context.shutdown.wait_timeout(interval) {
                break;
            }
            beats = beats.saturating_add(1);
            info!(target: HEARTBEAT_TARGET, beats, "heartbeat");
        }
        Ok(Outcome::success())
    }

    fn on_finish(&self) -> Result<(), CommandError> {
        info!(target: HEARTBEAT_TARGET, "heartbeat stopped");
        Ok(())
    }
}

pub(crate) fn heartbeat_command(app_name: &str) -> DaemonCommand<Heartbeat> {
    let help = HeartbeatArgs::command()
        .bin_name(format!("{app_name} daemon"))
        .render_help()
        .to_string();
    DaemonCommand::new("daemon", Heartbeat)
        .with_about("Runs a heartbeat until interrupted")
        .with_help(help.trim_end())
}

fn greet(invocation: &Invocation, output: &mut dyn OutputSink) -> Result<Outcome, CommandError> {
    let name = match invocation.arguments.as_slice() {
        [] => "world",
        [name] => name.as_str(),
        _ => {
            return Ok(Outcome::UsageFailure(String::from(
                "greet accepts at most one name",
            )));
        }
    };
    output.write_out(&format!("Hello, {name}!"))?;
    Ok(Outcome::success())
}

pub(crate) fn greet_command() -> impl Command {
    FnCommand::new("greet", greet).with_about("Prints a greeting")
}
