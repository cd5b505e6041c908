//! Output sinks used by the dispatcher and by handlers.
//!
//! Handlers never touch the process streams directly. The dispatcher owns an
//! [`OutputSink`] and lends it out, so tests capture everything written during
//! an invocation by substituting in-memory buffers.

use std::io::{self, Write};

/// Line-oriented access to the standard and error streams.
pub trait OutputSink {
    /// Writes `text` followed by a newline to the standard stream.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error when the write fails.
    fn write_out(&mut self, text: &str) -> io::Result<()>;

    /// Writes `text` followed by a newline to the error stream.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error when the write fails.
    fn write_err(&mut self, text: &str) -> io::Result<()>;
}

/// Which stream a message belongs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

impl Stream {
    /// Picks stdout for a zero exit code and stderr otherwise.
    #[must_use]
    pub const fn for_code(code: i32) -> Self {
        if code == crate::exit_code::SUCCESS {
            Self::Stdout
        } else {
            Self::Stderr
        }
    }
}

/// Writes `text` to the selected stream of `sink`.
///
/// # Errors
///
/// Returns the underlying IO error when the write fails.
pub fn write_to(sink: &mut dyn OutputSink, stream: Stream, text: &str) -> io::Result<()> {
    match stream {
        Stream::Stdout => sink.write_out(text),
        Stream::Stderr => sink.write_err(text),
    }
}

/// Bundles a pair of writers as an [`OutputSink`].
///
/// Production code wraps locked stdout/stderr handles; tests wrap `Vec<u8>`.
pub struct StreamSink<W: Write, E: Write> {
    stdout: W,
    stderr: E,
}

impl<W: Write, E: Write> StreamSink<W, E> {
    /// Wraps the two writers.
    pub const fn new(stdout: W, stderr: E) -> Self {
        Self { stdout, stderr }
    }

    /// Returns the wrapped writers.
    pub fn into_inner(self) -> (W, E) {
        (self.stdout, self.stderr)
    }
}

impl<W: Write, E: Write> OutputSink for StreamSink<W, E> {
    fn write_out(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.stdout, "{text}")?;
        self.stdout.flush()
    }

    fn write_err(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.stderr, "{text}")?;
        self.stderr.flush()
    }
}

/// Builds a sink over the process streams.
#[must_use]
pub fn stdio() -> StreamSink<io::Stdout, io::Stderr> {
    StreamSink::new(io::stdout(), io::stderr())
}
