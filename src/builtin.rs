use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Status, Stdin, Stdout};
use crate::env::Environment;
use crate::error::ShellError;
use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::fs;
use std::io::{self, Read, Write};

/// Text shown by `help` when no manual file is configured.
const MANUAL: &str = include_str!("../manual.txt");

/// Terminal escape sequence: cursor home, then clear to end of screen.
const CLEAR_SCREEN: &str = "\x1b[H\x1b[J";

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    /// Executes the command using provided IO streams and environment.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(
        self,
        stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        mut stdin: &mut dyn Stdin,
        mut stdout: &mut dyn Stdout,
        env: &mut Environment,
    ) -> Result<Status, ShellError> {
        let code = T::execute(*self, &mut stdin, &mut stdout, env)?;
        stdout.flush()?;
        Ok(Status::Exited(code))
    }
}

/// Stand-in produced when argh rejects the arguments (or `--help` was asked for).
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        _stdin: &mut dyn Stdin,
        stdout: &mut dyn Stdout,
        _env: &mut Environment,
    ) -> Result<Status, ShellError> {
        writeln!(stdout, "{}", self.output.trim_end())?;
        Ok(Status::Exited(if self.is_error { 1 } else { 0 }))
    }
}

/// Keyword table entry for the builtin `T`.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn name(&self) -> &'static str {
        T::name()
    }

    fn create(&self, args: &[&str]) -> Box<dyn ExecutableCommand> {
        match T::from_args(&[T::name()], args) {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                output,
                is_error: status.is_err(),
            }),
        }
    }
}

/// The shell's keywords, in table order.
pub(crate) fn registry() -> Vec<Box<dyn CommandFactory>> {
    vec![
        Box::new(Factory::<Cd>::default()),
        Box::new(Factory::<Clr>::default()),
        Box::new(Factory::<Dir>::default()),
        Box::new(Factory::<Environ>::default()),
        Box::new(Factory::<Echo>::default()),
        Box::new(Factory::<Help>::default()),
        Box::new(Factory::<Pause>::default()),
        Box::new(Factory::<Quit>::default()),
    ]
}

#[derive(FromArgs)]
/// Change the current working directory.
pub struct Cd {
    #[argh(positional, greedy)]
    /// directory to switch to; absolute or relative to the current directory.
    /// Further words are ignored.
    pub args: Vec<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let Some(target) = self.args.first() else {
            writeln!(stdout, "No directory specified for cd command")?;
            return Ok(1);
        };
        log::debug!("cd: changing directory to '{target}'");

        let new_dir = env.resolve(target);
        let canonical = fs::canonicalize(&new_dir)
            .with_context(|| format!("cd: {}", new_dir.display()))?;
        if !canonical.is_dir() {
            anyhow::bail!("cd: {}: not a directory", new_dir.display());
        }

        env::set_current_dir(&canonical)
            .with_context(|| format!("cd: can't chdir to {}", canonical.display()))?;
        writeln!(stdout, "New directory: {}", canonical.display())?;
        env.current_dir = canonical;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Clear the terminal screen.
pub struct Clr {
    #[argh(positional, greedy)]
    /// ignored
    pub _args: Vec<String>,
}

impl BuiltinCommand for Clr {
    fn name() -> &'static str {
        "clr"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        stdout.write_all(CLEAR_SCREEN.as_bytes())?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// List the entries of a directory, one per line.
pub struct Dir {
    #[argh(positional, greedy)]
    /// directory to list; defaults to the current directory.
    pub args: Vec<String>,
}

impl BuiltinCommand for Dir {
    fn name() -> &'static str {
        "dir"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let dir = env.resolve(self.args.first().map(String::as_str).unwrap_or("."));
        let entries = fs::read_dir(&dir)
            .with_context(|| format!("dir: cannot open {}", dir.display()))?;

        let mut names = entries
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect::<io::Result<Vec<_>>>()
            .with_context(|| format!("dir: cannot read {}", dir.display()))?;
        names.sort();

        writeln!(stdout, ".")?;
        writeln!(stdout, "..")?;
        for name in names {
            writeln!(stdout, "{name}")?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Print every environment variable as NAME=VALUE.
pub struct Environ {
    #[argh(positional, greedy)]
    /// ignored
    pub _args: Vec<String>,
}

impl BuiltinCommand for Environ {
    fn name() -> &'static str {
        "environ"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        for (key, value) in &env.vars {
            writeln!(stdout, "{key}={value}")?;
        }
        Ok(0)
    }
}

/// Write the arguments to standard output, separated by spaces, followed by a newline.
///
/// Every word is printed as-is, including ones that look like flags, so the
/// arguments are taken verbatim instead of going through argh's parser.
pub struct Echo {
    pub args: Vec<String>,
}

impl FromArgs for Echo {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Echo {
            args: args.iter().map(|arg| arg.to_string()).collect(),
        })
    }
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        writeln!(stdout, "{}", self.args.join(" "))?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Show the shell manual.
pub struct Help {
    #[argh(positional, greedy)]
    /// ignored
    pub _args: Vec<String>,
}

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        match &env.manual {
            Some(manual) => {
                let path = env.resolve(manual);
                let mut file = fs::File::open(&path)
                    .with_context(|| format!("help: cannot open {}", path.display()))?;
                io::copy(&mut file, stdout)
                    .with_context(|| format!("help: cannot read {}", path.display()))?;
            }
            None => stdout.write_all(MANUAL.as_bytes())?,
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Wait until Enter is pressed.
pub struct Pause {
    #[argh(positional, greedy)]
    /// ignored
    pub _args: Vec<String>,
}

impl BuiltinCommand for Pause {
    fn name() -> &'static str {
        "pause"
    }

    fn execute(
        self,
        stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        write!(stdout, "Press Enter to continue...")?;
        stdout.flush()?;

        // One byte at a time: a redirected stdin is shared with later
        // commands and must not be read past the newline.
        let mut byte = [0u8; 1];
        loop {
            match stdin.read(&mut byte) {
                Ok(0) => break,
                Ok(_) if byte[0] == b'\n' => break,
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e).context("pause: cannot read input"),
            }
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Exit the shell immediately.
pub struct Quit {
    #[argh(positional, greedy)]
    /// ignored
    pub _args: Vec<String>,
}

impl BuiltinCommand for Quit {
    fn name() -> &'static str {
        "quit"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        _stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        env.should_exit = true;
        Ok(0)
    }
}
