//! Test support utilities for dispatcher coverage.
//!
//! Supplies a recording output sink, a recording terminator, and a registry
//! of scripted commands so unit tests and step definitions remain focused on
//! their assertions.

use std::cell::RefCell;
use std::ffi::OsString;
use std::io;

use anyhow::{Context, Result, ensure};
use rstest::fixture;

use crate::{
    ArghParser, ClapParser, CommandError, CommandRegistry, Console, ExitSignal, FnCommand,
    Invocation, Outcome, OutputSink, Terminator,
};

pub(super) const APP_NAME: &str = "app";

/// One line written through the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Written {
    Out(String),
    Err(String),
}

/// Sink that keeps every write in order.
#[derive(Debug, Default)]
pub(super) struct RecordingSink {
    pub history: Vec<Written>,
}

impl RecordingSink {
    pub fn stdout_text(&self) -> String {
        self.collect(|entry| match entry {
            Written::Out(text) => Some(text.as_str()),
            Written::Err(_) => None,
        })
    }

    pub fn stderr_text(&self) -> String {
        self.collect(|entry| match entry {
            Written::Err(text) => Some(text.as_str()),
            Written::Out(_) => None,
        })
    }

    pub fn has_errors(&self) -> bool {
        self.history
            .iter()
            .any(|entry| matches!(entry, Written::Err(_)))
    }

    fn collect<F>(&self, select: F) -> String
    where
        F: Fn(&Written) -> Option<&str>,
    {
        self.history
            .iter()
            .filter_map(select)
            .map(|text| format!("{text}\n"))
            .collect()
    }
}

impl OutputSink for RecordingSink {
    fn write_out(&mut self, text: &str) -> io::Result<()> {
        self.history.push(Written::Out(text.to_owned()));
        Ok(())
    }

    fn write_err(&mut self, text: &str) -> io::Result<()> {
        self.history.push(Written::Err(text.to_owned()));
        Ok(())
    }
}

/// Terminator that records codes instead of exiting.
#[derive(Debug, Default)]
pub(super) struct RecordingTerminator {
    pub codes: RefCell<Vec<i32>>,
}

impl Terminator for RecordingTerminator {
    fn terminate(&self, code: i32) {
        self.codes.borrow_mut().push(code);
    }
}

/// Parser back-ends under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ParserKind {
    Clap,
    Argh,
}

impl std::str::FromStr for ParserKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().trim_matches('"').to_ascii_lowercase().as_str() {
            "clap" => Ok(Self::Clap),
            "argh" => Ok(Self::Argh),
            other => Err(format!("unsupported parser {other}")),
        }
    }
}

fn first_code(invocation: &Invocation) -> Result<i32, CommandError> {
    let raw = invocation
        .arguments
        .first()
        .ok_or_else(|| CommandError::failed("missing exit code"))?;
    raw.parse().map_err(CommandError::other)
}

/// Registry of scripted commands used across the dispatcher tests.
pub(super) fn scripted_registry() -> CommandRegistry {
    let build = || -> Result<CommandRegistry, crate::RegistryError> {
        Ok(CommandRegistry::builder()
            .register(
                FnCommand::new(
                    "exit",
                    |invocation: &Invocation, _: &mut dyn OutputSink| {
                        Ok(Outcome::Completed(first_code(invocation)?))
                    },
                )
                .with_about("Exits with the given code"),
            )?
            .register(FnCommand::new(
                "echo",
                |invocation: &Invocation, output: &mut dyn OutputSink| {
                    output.write_out(&invocation.arguments.join(" "))?;
                    Ok(Outcome::success())
                },
            ))?
            .register(FnCommand::new(
                "stop",
                |invocation: &Invocation, _: &mut dyn OutputSink| {
                    let code = first_code(invocation)?;
                    let message = invocation.arguments.get(1..).unwrap_or_default().join(" ");
                    let signal = if message.is_empty() {
                        ExitSignal::new(code)
                    } else {
                        ExitSignal::with_message(code, message)
                    };
                    Ok(Outcome::Stop(signal))
                },
            ))?
            .register(FnCommand::new(
                "fail",
                |_: &Invocation, _: &mut dyn OutputSink| -> Result<Outcome, CommandError> {
                    Err(CommandError::failed("disk on fire"))
                },
            ))?
            .register(FnCommand::new(
                "explode",
                |_: &Invocation, _: &mut dyn OutputSink| -> Result<Outcome, CommandError> {
                    panic!("handler exploded")
                },
            ))?
            .register(FnCommand::new(
                "usage",
                |_: &Invocation, _: &mut dyn OutputSink| {
                    Ok(Outcome::UsageFailure(String::from("missing --target")))
                },
            ))?
            .build())
    };
    build().expect("scripted registry is valid")
}

pub(super) fn console(kind: ParserKind) -> Console {
    let console = Console::new(APP_NAME, scripted_registry());
    match kind {
        ParserKind::Clap => console.with_parser(ClapParser),
        ParserKind::Argh => console.with_parser(ArghParser),
    }
}

pub(super) fn build_args(command: &str) -> Vec<OsString> {
    let mut args = vec![OsString::from(APP_NAME)];
    let trimmed = command.trim().trim_matches('"');
    if !trimmed.is_empty() {
        args.extend(trimmed.split_whitespace().map(OsString::from));
    }
    args
}

pub(super) struct TestWorld {
    pub parser: ParserKind,
    pub sink: RecordingSink,
    pub exit_code: Option<i32>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self {
            parser: ParserKind::Clap,
            sink: RecordingSink::default(),
            exit_code: None,
        }
    }
}

impl TestWorld {
    pub fn run(&mut self, command: &str) {
        self.sink = RecordingSink::default();
        let console = console(self.parser);
        self.exit_code = Some(console.run(build_args(command), &mut self.sink));
    }

    pub fn assert_exit_code(&self, expected: i32) -> Result<()> {
        let code = self.exit_code.context("exit code recorded")?;
        ensure!(code == expected, "expected exit code {expected}, got {code}");
        Ok(())
    }

    pub fn assert_single_message(&self) -> Result<()> {
        ensure!(
            self.sink.history.len() == 1,
            "expected exactly one message, got {:?}",
            self.sink.history
        );
        Ok(())
    }
}

#[fixture]
pub(super) fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}
