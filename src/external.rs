use crate::command::{ExecutableCommand, Status, Stdin, Stdout};
use crate::env::{Environment, PARENT_VAR};
use crate::error::ShellError;
use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

/// Command that is not a builtin.
pub struct ExternalCommand {
    name: String,
    args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Build from an argument vector whose first word names the program.
    pub fn from_argv(argv: &[&str]) -> Option<Self> {
        let (name, args) = argv.split_first()?;
        Some(Self::new(*name, args.iter().map(|a| a.to_string()).collect()))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(
        self: Box<Self>,
        stdin: &mut dyn Stdin,
        stdout: &mut dyn Stdout,
        env: &mut Environment,
    ) -> Result<Status, ShellError> {
        let search_paths = env.get_var("PATH").unwrap_or_default();
        let program = find_command_path(
            OsStr::new(&search_paths),
            &env.current_dir,
            Path::new(&self.name),
        )
        .ok_or_else(|| ShellError::ProgramNotFound(self.name.clone()))?;
        if !is_executable(&program) {
            return Err(ShellError::NotExecutable(self.name));
        }

        let mut cmd = std::process::Command::new(&program);
        cmd.args(&self.args)
            .stdin(stdin.stdio()?)
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir);
        if let Some(shell) = &env.shell_path {
            cmd.env(PARENT_VAR, shell);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.arg0(&self.name);
        }
        match stdout.stdio() {
            Some(handle) => cmd.stdout(handle),
            None => cmd.stdout(Stdio::piped()),
        };

        // Anything the shell wrote earlier has to land before the child's output.
        stdout.flush()?;
        log::debug!("spawning {} with {:?}", program.display(), self.args);
        let mut child = cmd.spawn().map_err(|source| ShellError::Spawn {
            name: self.name.clone(),
            source,
        })?;

        let copied = match child.stdout.take() {
            Some(mut pipe) => io::copy(&mut pipe, stdout).map(|_| ()),
            None => Ok(()),
        };
        // Reap the child even if copying its output failed.
        let exit_status = child.wait()?;
        copied?;

        let status = status_of(exit_status);
        log::debug!("{} finished: {status:?}", self.name);
        Ok(status)
    }
}

#[cfg(unix)]
fn status_of(exit_status: ExitStatus) -> Status {
    use std::os::unix::process::ExitStatusExt;
    match (exit_status.code(), exit_status.signal()) {
        (Some(code), _) => Status::Exited(code),
        (None, Some(signal)) => Status::Signaled(signal),
        (None, None) => Status::Exited(-1),
    }
}

#[cfg(not(unix))]
fn status_of(exit_status: ExitStatus) -> Status {
    Status::Exited(exit_status.code().unwrap_or(-1))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Resolve a command path the way `execvp` would.
///
/// Behavior:
/// - Empty path: returns `None`.
/// - Path with a separator (absolute, `bin/sh`, `./foo`): resolved against `cwd`
///   and returned if it is a file.
/// - Single component: each directory in `search_paths` (PATH) is tried in order,
///   relative entries against `cwd`. The first executable match wins; if no match
///   is executable the first existing file is returned so the caller can report it.
pub fn find_command_path(search_paths: &OsStr, cwd: &Path, path: &Path) -> Option<PathBuf> {
    let mut components = path.components();
    match (components.next(), components.next()) {
        (None, _) => None,
        (Some(_), None) if !path.is_absolute() => find_in_path(search_paths, cwd, path.as_os_str()),
        _ => Some(cwd.join(path)).filter(|p| p.is_file()),
    }
}

fn find_in_path(search_paths: &OsStr, cwd: &Path, cmd: &OsStr) -> Option<PathBuf> {
    let candidates: Vec<PathBuf> = std::env::split_paths(search_paths)
        .map(|dir| cwd.join(dir).join(cmd))
        .filter(|p| p.is_file())
        .collect();
    candidates
        .iter()
        .find(|p| is_executable(p))
        .or_else(|| candidates.first())
        .cloned()
}
