use crate::command::Stdin;
use std::collections::HashMap;
use std::env as stdenv;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// Variable under which the interpreter publishes its own executable path.
pub const SHELL_VAR: &str = "shell";

/// Variable a launched child receives, naming the interpreter that started it.
pub const PARENT_VAR: &str = "parent";

/// Where standard input currently comes from.
///
/// Input redirection replaces the source for the rest of the session, so this
/// lives in the [`Environment`] rather than in a single command invocation.
#[derive(Debug, Default)]
pub enum InputSource {
    /// The interpreter's own standard input.
    #[default]
    Inherited,
    /// A file bound by `<`. Children get a duplicate of this handle, so the
    /// read position is shared with them.
    Redirected { path: PathBuf, file: File },
}

impl InputSource {
    /// The bound file, if standard input has been redirected.
    pub fn path(&self) -> Option<&Path> {
        match self {
            InputSource::Inherited => None,
            InputSource::Redirected { path, .. } => Some(path),
        }
    }
}

impl Read for InputSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            InputSource::Inherited => io::stdin().read(buf),
            InputSource::Redirected { file, .. } => file.read(buf),
        }
    }
}

impl Stdin for InputSource {
    fn stdio(&self) -> io::Result<Stdio> {
        match self {
            InputSource::Inherited => Ok(Stdio::inherit()),
            InputSource::Redirected { file, .. } => file.stdio(),
        }
    }
}

/// Process context shared by every command the interpreter runs.
///
/// The environment contains:
/// - `vars`: variables that will be visible to executed commands.
/// - `current_dir`: the working directory for command execution.
/// - `stdin`: the current standard-input source (see [`InputSource`]).
/// - `shell_path`: the interpreter's own executable, when it could be resolved.
/// - `manual`: an optional manual file shown by `help`.
/// - `should_exit`: set by `quit`; the session loop stops as soon as it sees it.
#[derive(Debug)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    pub stdin: InputSource,
    pub shell_path: Option<PathBuf>,
    pub manual: Option<PathBuf>,
    pub should_exit: bool,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    ///
    /// Copies variables from `std::env::vars()`, takes `current_dir` from
    /// `std::env::current_dir()` and publishes the interpreter's own path as
    /// [`SHELL_VAR`].
    pub fn new() -> Self {
        let vars = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let mut env = Self::with_vars(vars, current_dir);

        match stdenv::current_exe() {
            Ok(path) => env.publish_shell_path(path),
            Err(e) => log::warn!("cannot resolve own executable path: {e}"),
        }
        env
    }

    /// An environment with exactly the given variables and nothing published.
    pub fn with_vars(vars: HashMap<String, String>, current_dir: PathBuf) -> Self {
        Self {
            vars,
            current_dir,
            stdin: InputSource::Inherited,
            shell_path: None,
            manual: None,
            should_exit: false,
        }
    }

    /// Record the interpreter's own path and expose it as [`SHELL_VAR`].
    pub fn publish_shell_path(&mut self, path: PathBuf) {
        log::info!("{SHELL_VAR} set to {}", path.display());
        self.set_var(SHELL_VAR, path.to_string_lossy());
        self.shell_path = Some(path);
    }

    /// Get the value of an environment variable.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Resolve `path` against `current_dir` unless it is already absolute.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.current_dir.join(path)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializes tests that change the process working directory.
#[cfg(test)]
pub(crate) fn lock_current_dir() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};
    static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
    MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
