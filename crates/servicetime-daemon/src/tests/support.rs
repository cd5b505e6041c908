//! Test doubles for daemon lifecycle coverage.

use std::cell::{Cell, RefCell};
use std::ffi::OsString;
use std::io;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rstest::fixture;
use servicetime_console::exit_code::EARLY_EXIT;
use servicetime_console::{
    ArghParser, CommandError, CommandRegistry, Console, ExitSignal, Invocation, Outcome,
    StreamSink, Terminator,
};

use crate::{
    Daemon, DaemonCommand, DaemonContext, InterruptGuard, InterruptSource, LifecycleError,
    SecondSignalPolicy, ShutdownCoordinator, SignalDisposition,
};

pub(super) const SIGINT: i32 = 2;
pub(super) const SIGTERM: i32 = 15;
pub(super) const WAIT_LIMIT: Duration = Duration::from_secs(5);

/// What the test daemon does when asked to work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Work {
    Complete(i32),
    Stop(i32, Option<String>),
    Fail(String),
    Panic,
    WaitForShutdown,
}

#[derive(Debug)]
pub(super) struct TestDaemon {
    pub work: Work,
    pub cleanup_fails: bool,
    pub graceful: Option<i32>,
    pub finish_calls: Cell<usize>,
    pub work_calls: Cell<usize>,
}

impl TestDaemon {
    pub fn new(work: Work) -> Self {
        Self {
            work,
            cleanup_fails: false,
            graceful: Some(EARLY_EXIT),
            finish_calls: Cell::new(0),
            work_calls: Cell::new(0),
        }
    }

    pub fn with_failing_cleanup(mut self) -> Self {
        self.cleanup_fails = true;
        self
    }

    pub fn with_graceful_exit(mut self, graceful: Option<i32>) -> Self {
        self.graceful = graceful;
        self
    }
}

impl Daemon for TestDaemon {
    fn do_work(&self, context: DaemonContext<'_>) -> Result<Outcome, CommandError> {
        self.work_calls.set(self.work_calls.get() + 1);
        match &self.work {
            Work::Complete(code) => Ok(Outcome::Completed(*code)),
            Work::Stop(code, None) => Ok(Outcome::Stop(ExitSignal::new(*code))),
            Work::Stop(code, Some(message)) => Ok(Outcome::Stop(ExitSignal::with_message(
                *code,
                message.clone(),
            ))),
            Work::Fail(message) => Err(CommandError::failed(message.clone())),
            Work::Panic => panic!("work exploded"),
            Work::WaitForShutdown => {
                context.output.write_out("waiting for shutdown")?;
                if context.shutdown.wait_timeout(WAIT_LIMIT) {
                    Ok(Outcome::success())
                } else {
                    Err(CommandError::failed("shutdown never arrived"))
                }
            }
        }
    }

    fn on_finish(&self) -> Result<(), CommandError> {
        self.finish_calls.set(self.finish_calls.get() + 1);
        if self.cleanup_fails {
            Err(CommandError::failed("socket still bound"))
        } else {
            Ok(())
        }
    }

    fn graceful_exit(&self) -> Option<i32> {
        self.graceful
    }
}

/// Daemon relying on every default hook.
pub(super) struct PlainDaemon;

impl Daemon for PlainDaemon {
    fn do_work(&self, context: DaemonContext<'_>) -> Result<Outcome, CommandError> {
        context.shutdown.wait_timeout(WAIT_LIMIT);
        Ok(Outcome::success())
    }
}

/// Terminator that records codes instead of exiting.
#[derive(Debug, Default)]
pub(super) struct RecordingTerminator {
    codes: Mutex<Vec<i32>>,
}

impl RecordingTerminator {
    pub fn codes(&self) -> Vec<i32> {
        self.codes
            .lock()
            .map(|codes| codes.clone())
            .unwrap_or_default()
    }
}

impl Terminator for RecordingTerminator {
    fn terminate(&self, code: i32) {
        if let Ok(mut codes) = self.codes.lock() {
            codes.push(code);
        }
    }
}

/// Delivers a fixed list of signals synchronously when listening starts.
#[derive(Debug, Default, Clone)]
pub(super) struct ScriptedInterrupts {
    signals: Vec<i32>,
    dispositions: Arc<Mutex<Vec<SignalDisposition>>>,
}

impl ScriptedInterrupts {
    pub fn new(signals: Vec<i32>) -> Self {
        Self {
            signals,
            dispositions: Arc::default(),
        }
    }

    pub fn dispositions(&self) -> Vec<SignalDisposition> {
        self.dispositions
            .lock()
            .map(|dispositions| dispositions.clone())
            .unwrap_or_default()
    }
}

impl InterruptSource for ScriptedInterrupts {
    fn listen(&self, coordinator: ShutdownCoordinator) -> Result<InterruptGuard, LifecycleError> {
        for signal in &self.signals {
            let disposition = coordinator.deliver(*signal);
            if let Ok(mut dispositions) = self.dispositions.lock() {
                dispositions.push(disposition);
            }
        }
        Ok(InterruptGuard::inert())
    }
}

/// Delivers one signal from a background thread after a delay.
#[derive(Debug, Clone, Copy)]
pub(super) struct DelayedInterrupt {
    pub signal: i32,
    pub delay: Duration,
}

impl InterruptSource for DelayedInterrupt {
    fn listen(&self, coordinator: ShutdownCoordinator) -> Result<InterruptGuard, LifecycleError> {
        let DelayedInterrupt { signal, delay } = *self;
        let thread = thread::spawn(move || {
            thread::sleep(delay);
            coordinator.deliver(signal);
        });
        Ok(InterruptGuard::joining(thread))
    }
}

/// Fails to install, as if signal registration were refused.
#[derive(Debug, Clone, Copy)]
pub(super) struct BrokenInterrupts;

impl InterruptSource for BrokenInterrupts {
    fn listen(&self, _coordinator: ShutdownCoordinator) -> Result<InterruptGuard, LifecycleError> {
        Err(LifecycleError::Install {
            source: io::Error::other("signal registration refused"),
        })
    }
}

pub(super) type BufferSink = StreamSink<Vec<u8>, Vec<u8>>;

pub(super) fn buffer_sink() -> BufferSink {
    StreamSink::new(Vec::new(), Vec::new())
}

pub(super) fn sink_text(sink: BufferSink) -> (String, String) {
    let (stdout, stderr) = sink.into_inner();
    (
        String::from_utf8(stdout).expect("stdout utf8"),
        String::from_utf8(stderr).expect("stderr utf8"),
    )
}

pub(super) fn invocation() -> Invocation {
    Invocation::new("daemon", Vec::<String>::new())
}

pub(super) fn quiet_command(daemon: TestDaemon) -> DaemonCommand<TestDaemon> {
    DaemonCommand::new("daemon", daemon).with_interrupts(crate::NoInterrupts)
}

pub(super) fn console_for<S>(daemon: TestDaemon, interrupts: S) -> Console
where
    S: InterruptSource + 'static,
{
    let command = DaemonCommand::new("daemon", daemon)
        .with_interrupts(interrupts)
        .with_second_signal_policy(SecondSignalPolicy::Ignore);
    let registry = CommandRegistry::builder()
        .register(command)
        .expect("register daemon")
        .build();
    Console::new("test", registry).with_parser(ArghParser)
}

pub(super) fn daemon_args() -> Vec<OsString> {
    vec![OsString::from("test"), OsString::from("daemon")]
}

/// Shared state for the lifecycle scenarios.
pub(super) struct LifecycleWorld {
    pub work: Work,
    pub cleanup_fails: bool,
    pub graceful: Option<i32>,
    pub signals: Vec<i32>,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl Default for LifecycleWorld {
    fn default() -> Self {
        Self {
            work: Work::Complete(0),
            cleanup_fails: false,
            graceful: Some(EARLY_EXIT),
            signals: Vec::new(),
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

impl LifecycleWorld {
    pub fn run(&mut self) {
        let mut daemon = TestDaemon::new(self.work.clone()).with_graceful_exit(self.graceful);
        if self.cleanup_fails {
            daemon = daemon.with_failing_cleanup();
        }
        let console = console_for(daemon, ScriptedInterrupts::new(self.signals.clone()));
        let mut sink = buffer_sink();
        self.exit_code = Some(console.run(daemon_args(), &mut sink));
        let (stdout, stderr) = sink_text(sink);
        self.stdout = stdout;
        self.stderr = stderr;
    }
}

#[fixture]
pub(super) fn world() -> RefCell<LifecycleWorld> {
    RefCell::new(LifecycleWorld::default())
}
