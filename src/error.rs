use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Recoverable failures of a single command line.
///
/// None of these end the session: the interpreter reports them and moves on
/// to the next line. Startup failures are plain [`anyhow::Error`]s instead.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The first word of the line is an operator.
    #[error("invalid command: '{0}' cannot start a command")]
    InvalidCommand(String),

    /// A redirection operator is the last word of the line.
    #[error("no file specified after '{0}'")]
    MissingRedirectTarget(&'static str),

    #[error("cannot redirect input from '{}': {source}", path.display())]
    InputRedirect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot redirect output to '{}': {source}", path.display())]
    OutputRedirect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Output redirection was requested but the command produced no buffer.
    #[error("nothing captured to write to '{}'", .0.display())]
    NothingCaptured(PathBuf),

    #[error("{0}: program not found")]
    ProgramNotFound(String),

    #[error("{0}: not executable")]
    NotExecutable(String),

    #[error("failed to launch {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    /// A built-in command failed; carries its context chain.
    #[error(transparent)]
    Builtin(#[from] anyhow::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}
