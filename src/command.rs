use crate::env::Environment;
use crate::error::ShellError;
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::process::Stdio;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// How a command finished.
///
/// Built-ins always report [`Status::Exited`]; external programs may also be
/// killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Normal termination with the given exit code.
    Exited(ExitCode),
    /// Termination by the given signal number.
    Signaled(i32),
}

impl Status {
    pub fn success(self) -> bool {
        self == Status::Exited(0)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Exited(code) => write!(f, "Child exited with status {code}"),
            Status::Signaled(signal) => write!(f, "Child terminated by signal {signal}"),
        }
    }
}

/// Abstraction over a readable input stream that can also hand out a
/// [`Stdio`] handle for spawning external processes.
///
/// The handle must refer to the same underlying stream, so that a child and
/// later readers share one read position.
pub trait Stdin: Read {
    /// Produce a [`Stdio`] handle suitable for `std::process::Command`.
    fn stdio(&self) -> io::Result<Stdio>;
}

impl Stdin for File {
    fn stdio(&self) -> io::Result<Stdio> {
        Ok(self.try_clone()?.into())
    }
}

/// Abstraction over a writable output stream used by commands.
pub trait Stdout: Write {
    /// A [`Stdio`] handle a child can write to directly.
    ///
    /// `None` means the stream lives in memory: the child's output has to be
    /// piped back and copied into this writer.
    fn stdio(&self) -> Option<Stdio>;
}

impl Stdout for io::Stdout {
    fn stdio(&self) -> Option<Stdio> {
        Some(Stdio::inherit())
    }
}

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
pub trait ExecutableCommand {
    /// Executes the command, blocking until it has finished.
    fn execute(
        self: Box<Self>,
        stdin: &mut dyn Stdin,
        stdout: &mut dyn Stdout,
        env: &mut Environment,
    ) -> Result<Status, ShellError>;
}

/// One entry of the keyword table: a named factory for a built-in command.
pub trait CommandFactory {
    /// The keyword this factory answers to, e.g. "cd".
    fn name(&self) -> &'static str;

    /// Create a command instance for the words following the keyword.
    fn create(&self, args: &[&str]) -> Box<dyn ExecutableCommand>;
}
