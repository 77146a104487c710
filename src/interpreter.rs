use crate::command::{ExecutableCommand, ExitCode, Status, Stdout};
use crate::env::Environment;
use crate::error::ShellError;
use crate::external::ExternalCommand;
use crate::io_adapters::CaptureBuffer;
use crate::lexer::{Redirect, Token, TokenKind, TokenTable};
use crate::prompt;
use crate::redirect::{self, WriteMode};
use anyhow::Context;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, BufRead, Write};
use std::ops::ControlFlow;

/// Longest line, in bytes, the session hands to the pipeline.
pub const MAX_LINE_LENGTH: usize = 512;

/// Input that ends the session.
const EXIT_COMMAND: &str = "exit";

/// Result of running one command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The line held no words.
    NoOp,
    /// A built-in ran and returned this exit code.
    Builtin(ExitCode),
    /// An external program ran and finished like this.
    External(Status),
    /// `quit` was executed; the session must end now.
    Quit,
}

/// Redirections found on a line: the first `<` and the first `>`/`>>`.
#[derive(Debug, Default, PartialEq, Eq)]
struct Redirections<'a> {
    input: Option<&'a str>,
    output: Option<(&'a str, WriteMode)>,
}

impl<'a> Redirections<'a> {
    fn scan(tokens: &'a [Token<'_>]) -> Result<Self, ShellError> {
        let mut found = Self::default();
        for (i, token) in tokens.iter().enumerate() {
            let TokenKind::Operator(op) = token.kind else {
                continue;
            };
            let taken = match op {
                Redirect::Input => found.input.is_some(),
                Redirect::Output(_) => found.output.is_some(),
            };
            if taken {
                log::debug!("ignoring additional '{}'", op.symbol());
                continue;
            }

            let target = tokens
                .get(i + 1)
                .filter(|next| !next.is_operator())
                .ok_or(ShellError::MissingRedirectTarget(op.symbol()))?;
            match op {
                Redirect::Input => found.input = Some(target.text.as_str()),
                Redirect::Output(mode) => found.output = Some((target.text.as_str(), mode)),
            }
        }
        Ok(found)
    }
}

/// A minimal shell-like interpreter that can execute built-in and external commands.
///
/// The interpreter owns the process context ([`Environment`]) and the
/// [`TokenTable`] used to classify words. Each line goes through
/// [`Interpreter::execute_line`]; [`Interpreter::repl`] and
/// [`Interpreter::run_script`] feed it from a terminal or a batch file.
///
/// Example
/// ```
/// use myshell::{Interpreter, Outcome};
/// use myshell::io_adapters::CaptureBuffer;
///
/// let mut sh = Interpreter::default();
/// let mut out = CaptureBuffer::new();
/// let outcome = sh.execute_line_to("echo hello world", &mut out).unwrap();
/// assert_eq!(outcome, Outcome::Builtin(0));
/// assert_eq!(out.as_bytes(), b"hello world\n");
/// ```
pub struct Interpreter {
    env: Environment,
    table: TokenTable,
}

impl Interpreter {
    pub fn new(env: Environment, table: TokenTable) -> Self {
        Self { env, table }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Run one command line with output going to the process's stdout.
    pub fn execute_line(&mut self, line: &str) -> Result<Outcome, ShellError> {
        self.execute_line_to(line, &mut io::stdout())
    }

    /// Run one command line, writing command output that is not redirected to `stdout`.
    pub fn execute_line_to(
        &mut self,
        line: &str,
        stdout: &mut dyn Stdout,
    ) -> Result<Outcome, ShellError> {
        let tokens = self.table.tokenize(line);
        let Some(first) = tokens.first() else {
            return Ok(Outcome::NoOp);
        };
        if first.is_operator() {
            return Err(ShellError::InvalidCommand(first.text.clone()));
        }

        let redirections = Redirections::scan(&tokens)?;
        let boundary = tokens
            .iter()
            .position(Token::is_operator)
            .unwrap_or(tokens.len());
        let argv: Vec<&str> = tokens[..boundary].iter().map(|t| t.text.as_str()).collect();

        let (command, is_builtin): (Box<dyn ExecutableCommand>, bool) = match first.kind {
            TokenKind::Keyword(factory) => {
                log::debug!("builtin {} with {:?}", factory.name(), &argv[1..]);
                (factory.create(&argv[1..]), true)
            }
            _ => match ExternalCommand::from_argv(&argv) {
                Some(external) => (Box::new(external), false),
                None => return Ok(Outcome::NoOp),
            },
        };

        if let Some(file) = redirections.input {
            redirect::rebind_input(&mut self.env, file)?;
        }

        let status = match redirections.output {
            None => run(command, stdout, &mut self.env)?,
            Some((file, mode)) => {
                let mut capture = CaptureBuffer::new();
                let status = run(command, &mut capture, &mut self.env)?;
                redirect::write_captured(Some(capture.as_bytes()), file, mode, &self.env)?;
                status
            }
        };

        Ok(match status {
            _ if self.env.should_exit => Outcome::Quit,
            Status::Exited(code) if is_builtin => Outcome::Builtin(code),
            status => Outcome::External(status),
        })
    }

    /// Handle one line of session input and decide whether the session goes on.
    ///
    /// Errors are reported on stderr; status lines of external programs go to `stdout`.
    fn process(&mut self, line: &str, stdout: &mut dyn Stdout) -> ControlFlow<()> {
        let line = clamp_line(line);
        if line == EXIT_COMMAND {
            return ControlFlow::Break(());
        }

        match self.execute_line_to(line, stdout) {
            Ok(Outcome::Quit) => return ControlFlow::Break(()),
            Ok(Outcome::External(status)) => {
                if let Err(e) = writeln!(stdout, "{status}") {
                    log::warn!("cannot write status line: {e}");
                }
            }
            Ok(_) => {}
            Err(err) => report(&err),
        }
        if let Err(e) = stdout.flush() {
            log::warn!("cannot flush output: {e}");
        }
        ControlFlow::Continue(())
    }

    /// Interactive read-eval-print loop.
    ///
    /// Ends on `exit`, `quit` or end of input. Ctrl-C only abandons the current line.
    pub fn repl(&mut self, stdout: &mut dyn Stdout) -> anyhow::Result<()> {
        let mut rl = DefaultEditor::new().context("cannot initialise line editor")?;

        loop {
            let readline = rl.readline(&prompt::render(&self.env.current_dir));
            match readline {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str())?;
                    }
                    if self.process(&line, stdout).is_break() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err).context("cannot read command line"),
            }
        }
        Ok(())
    }

    /// Execute every line of a batch script, without prompting.
    pub fn run_script(&mut self, input: impl BufRead, stdout: &mut dyn Stdout) -> anyhow::Result<()> {
        for line in input.lines() {
            let line = line.context("cannot read batch input")?;
            if self.process(&line, stdout).is_break() {
                break;
            }
        }
        Ok(())
    }
}

impl Default for Interpreter {
    /// An interpreter over the current process environment with the shell's own built-ins.
    fn default() -> Self {
        Self::new(Environment::new(), TokenTable::default())
    }
}

fn run(
    command: Box<dyn ExecutableCommand>,
    stdout: &mut dyn Stdout,
    env: &mut Environment,
) -> Result<Status, ShellError> {
    // The stdin source is moved out for the call so the command can still
    // borrow the rest of the environment mutably.
    let mut stdin = std::mem::take(&mut env.stdin);
    let result = command.execute(&mut stdin, stdout, env);
    env.stdin = stdin;
    result
}

fn report(err: &ShellError) {
    match err {
        ShellError::Builtin(e) => eprintln!("myshell: {e:#}"),
        _ => eprintln!("myshell: {err}"),
    }
}

/// Cut `line` to at most [`MAX_LINE_LENGTH`] bytes on a char boundary.
fn clamp_line(line: &str) -> &str {
    if line.len() <= MAX_LINE_LENGTH {
        return line;
    }
    let mut end = MAX_LINE_LENGTH;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    log::warn!("line longer than {MAX_LINE_LENGTH} bytes truncated");
    &line[..end]
}
