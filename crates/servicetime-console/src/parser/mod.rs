//! Argument parsing back-ends.
//!
//! The dispatcher only sees [`ParsedArgs`]. Each back-end wraps a different
//! parsing library behind [`ArgumentParser`], so swapping libraries never
//! touches dispatch logic.

mod argh_parser;
mod clap_parser;

use std::ffi::OsString;

pub use argh_parser::ArghParser;
pub use clap_parser::ClapParser;

use crate::command::Invocation;
use crate::errors::UsageError;
use crate::registry::CommandSummary;

/// Static facts about the application that parsers render into help text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    /// Application name shown in usage lines.
    pub name: String,
    /// Optional description shown under the usage line.
    pub about: Option<String>,
    /// Registered commands, ordered by name.
    pub commands: Vec<CommandSummary>,
}

/// Structured result of parsing argv.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedArgs {
    /// The operator asked for help; the text is ready to print.
    Help(String),
    /// No command was supplied; `usage` explains what was expected.
    Bare {
        /// Rendered usage for the application.
        usage: String,
    },
    /// A command name and its trailing arguments.
    Command(Invocation),
}

/// Turns argv into [`ParsedArgs`].
///
/// `args` follows the `std::env::args_os` convention: the first element is
/// the program name.
pub trait ArgumentParser {
    /// Parses `args` for the application described by `app`.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError`] when the arguments are malformed.
    fn parse(&self, app: &AppInfo, args: &[OsString]) -> Result<ParsedArgs, UsageError>;
}

/// Renders the command listing appended to help output.
pub(crate) fn render_listing(commands: &[CommandSummary]) -> String {
    if commands.is_empty() {
        return String::from("Commands:\n  (none registered)");
    }
    let width = commands
        .iter()
        .map(|command| command.name.len())
        .max()
        .unwrap_or_default();
    let mut listing = String::from("Commands:");
    for command in commands {
        let line = format!("\n  {:<width$}  {}", command.name, command.about);
        listing.push_str(line.trim_end());
    }
    listing
}

/// Returns true for the flags every back-end treats as a help request.
pub(crate) fn is_help_flag(argument: &OsString) -> bool {
    argument == "--help" || argument == "-h"
}

/// Recognises `<command> --help [ARG]...` so the command, not the
/// application, receives the flag.
///
/// clap gives its own help flag precedence while the first trailing argument
/// is pending, so argv of this shape is resolved before either back-end runs.
/// Everything after the command name is kept.
pub(crate) fn command_help_request(args: &[OsString]) -> Option<Invocation> {
    let [_, name, flag, rest @ ..] = args else {
        return None;
    };
    let name = name.to_str()?;
    if name.starts_with('-') || !is_help_flag(flag) {
        return None;
    }
    let arguments = std::iter::once(flag)
        .chain(rest)
        .map(|argument| argument.to_string_lossy().into_owned());
    Some(Invocation::new(name, arguments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn summary(name: &str, about: &str) -> CommandSummary {
        CommandSummary {
            name: name.to_owned(),
            about: about.to_owned(),
        }
    }

    #[test]
    fn listing_aligns_descriptions() {
        let listing = render_listing(&[summary("daemon", "Runs forever"), summary("hi", "")]);
        assert_eq!(listing, "Commands:\n  daemon  Runs forever\n  hi");
    }

    #[test]
    fn help_after_a_command_belongs_to_the_command() {
        let args: Vec<OsString> = ["app", "daemon", "-h"].iter().map(OsString::from).collect();
        assert_eq!(
            command_help_request(&args),
            Some(Invocation::new("daemon", ["-h"]))
        );
    }

    #[test]
    fn arguments_after_a_command_help_flag_are_kept() {
        let args: Vec<OsString> = ["app", "daemon", "--help", "extra"]
            .iter()
            .map(OsString::from)
            .collect();
        assert_eq!(
            command_help_request(&args),
            Some(Invocation::new("daemon", ["--help", "extra"]))
        );
    }

    #[test]
    fn help_alone_is_not_a_command_request() {
        let args: Vec<OsString> = ["app", "--help"].iter().map(OsString::from).collect();
        assert_eq!(command_help_request(&args), None);
    }

    #[test]
    fn empty_listing_says_so() {
        assert_eq!(render_listing(&[]), "Commands:\n  (none registered)");
    }

    #[rstest]
    #[case(&["daemon", "--help", "extra"])]
    #[case(&["daemon", "-h", "--ticks", "3"])]
    #[case(&["daemon", "--ticks", "3"])]
    #[case(&["daemon", "3"])]
    #[case(&["help"])]
    #[case(&["help", "daemon"])]
    fn back_ends_agree_on_command_invocations(#[case] words: &[&str]) {
        let app = AppInfo {
            name: String::from("app"),
            about: None,
            commands: vec![summary("daemon", "Runs forever")],
        };
        let args: Vec<OsString> = std::iter::once("app")
            .chain(words.iter().copied())
            .map(OsString::from)
            .collect();

        let clap = ClapParser.parse(&app, &args).expect("clap parses");
        let argh = ArghParser.parse(&app, &args).expect("argh parses");

        assert!(matches!(clap, ParsedArgs::Command(_)), "clap: {clap:?}");
        assert_eq!(clap, argh);
    }
}
