//! [`ArgumentParser`] backed by clap's builder API.
//!
//! Commands are registered at runtime, so the parser models them as a
//! `COMMAND` positional plus trailing arguments, the same shape the derive
//! API would produce for `<DOMAIN> [ARG]...`.

use std::ffi::OsString;

use clap::error::ErrorKind;
use clap::{Arg, ArgMatches};

use super::{AppInfo, ArgumentParser, ParsedArgs, command_help_request, render_listing};
use crate::command::Invocation;
use crate::errors::UsageError;

const COMMAND_ARG: &str = "command";
const ARGUMENTS_ARG: &str = "arguments";

/// Parses argv with clap.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClapParser;

impl ClapParser {
    fn build(app: &AppInfo) -> clap::Command {
        let mut command = clap::Command::new(app.name.clone())
            .bin_name(app.name.clone())
            .disable_help_subcommand(true)
            .disable_version_flag(true)
            .after_help(render_listing(&app.commands))
            .arg(
                Arg::new(COMMAND_ARG)
                    .value_name("COMMAND")
                    .help("The command to run"),
            )
            .arg(
                Arg::new(ARGUMENTS_ARG)
                    .value_name("ARG")
                    .help("Arguments passed to the command")
                    .num_args(0..)
                    .trailing_var_arg(true)
                    .allow_hyphen_values(true),
            );
        if let Some(about) = &app.about {
            command = command.about(about.clone());
        }
        command
    }

    fn invocation(matches: &ArgMatches) -> Option<Invocation> {
        let name = matches.get_one::<String>(COMMAND_ARG)?.clone();
        let arguments: Vec<String> = matches
            .get_many::<String>(ARGUMENTS_ARG)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        Some(Invocation { name, arguments })
    }
}

impl ArgumentParser for ClapParser {
    fn parse(&self, app: &AppInfo, args: &[OsString]) -> Result<ParsedArgs, UsageError> {
        if let Some(invocation) = command_help_request(args) {
            return Ok(ParsedArgs::Command(invocation));
        }
        let mut command = Self::build(app);
        match command.try_get_matches_from_mut(args.iter().cloned()) {
            Ok(matches) => Ok(Self::invocation(&matches).map_or_else(
                || ParsedArgs::Bare {
                    usage: command.render_help().to_string(),
                },
                ParsedArgs::Command,
            )),
            Err(error) if error.kind() == ErrorKind::DisplayHelp => {
                Ok(ParsedArgs::Help(error.render().to_string()))
            }
            Err(error) => {
                let rendered = error.render().to_string();
                let message = rendered
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .trim_start_matches("error: ")
                    .to_owned();
                Err(UsageError::new(command.render_usage().to_string(), message))
            }
        }
    }
}
