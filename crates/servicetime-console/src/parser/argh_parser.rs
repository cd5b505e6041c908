//! [`ArgumentParser`] backed by argh.

use std::ffi::OsString;

use argh::{EarlyExit, FromArgs};

use super::{
    AppInfo, ArgumentParser, ParsedArgs, command_help_request, is_help_flag, render_listing,
};
use crate::command::Invocation;
use crate::errors::UsageError;

const HELP_WORD: &str = "help";

/// Dispatches a named command.
#[derive(FromArgs, Debug)]
struct ArghArgs {
    /// the command to run, followed by its arguments
    #[argh(positional, greedy)]
    words: Vec<String>,
}

/// Parses argv with argh.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArghParser;

impl ArghParser {
    fn help(app: &AppInfo) -> String {
        let output = match ArghArgs::from_args(&[app.name.as_str()], &["--help"]) {
            Ok(_) => String::new(),
            Err(EarlyExit { output, .. }) => output,
        };
        let mut help = output.trim_end().to_owned();
        if let Some(about) = &app.about {
            help = help.replacen("Dispatches a named command.", about, 1);
        }
        format!("{help}\n\n{}\n", render_listing(&app.commands))
    }

    fn usage(app: &AppInfo) -> String {
        Self::help(app)
            .lines()
            .next()
            .unwrap_or_default()
            .to_owned()
    }

    fn utf8_arguments<'a>(app: &AppInfo, args: &'a [OsString]) -> Result<Vec<&'a str>, UsageError> {
        args.iter()
            .skip(1)
            .map(|argument| {
                argument.to_str().ok_or_else(|| {
                    UsageError::new(
                        Self::usage(app),
                        format!("invalid UTF-8 in argument {}", argument.to_string_lossy()),
                    )
                })
            })
            .collect()
    }
}

impl ArgumentParser for ArghParser {
    fn parse(&self, app: &AppInfo, args: &[OsString]) -> Result<ParsedArgs, UsageError> {
        if args.get(1).is_some_and(is_help_flag) {
            return Ok(ParsedArgs::Help(Self::help(app)));
        }
        if let Some(invocation) = command_help_request(args) {
            return Ok(ParsedArgs::Command(invocation));
        }
        if args.get(1).is_some_and(|first| first == HELP_WORD) {
            // argh would answer a leading `help` itself; it names a command here.
            let arguments = Self::utf8_arguments(app, args)?;
            return Ok(ParsedArgs::Command(Invocation::new(
                HELP_WORD,
                arguments.iter().skip(1).copied(),
            )));
        }
        let arguments = Self::utf8_arguments(app, args)?;
        match ArghArgs::from_args(&[app.name.as_str()], &arguments) {
            Ok(ArghArgs { mut words }) if !words.is_empty() => {
                let arguments = words.split_off(1);
                let name = words.remove(0);
                Ok(ParsedArgs::Command(Invocation { name, arguments }))
            }
            Ok(_) => Ok(ParsedArgs::Bare {
                usage: Self::help(app),
            }),
            Err(EarlyExit {
                status: Ok(()), ..
            }) => Ok(ParsedArgs::Help(Self::help(app))),
            Err(EarlyExit {
                output,
                status: Err(()),
            }) => Err(UsageError::new(Self::usage(app), output.trim())),
        }
    }
}
