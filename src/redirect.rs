//! Input and output redirection.
//!
//! Input redirection rebinds the session's standard input, which stays bound
//! until the next `<`. Output redirection is a post-hoc step: the command's
//! output was captured in memory and is written to the target once the
//! command has finished, so the target is never opened for a command that
//! could not run.

use crate::env::{Environment, InputSource};
use crate::error::ShellError;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};

/// How `>`-style redirection treats an existing target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Truncate,
    Append,
}

/// Bind standard input to `file` for the rest of the session.
///
/// On failure the previous source stays in place.
pub fn rebind_input(env: &mut Environment, file: &str) -> Result<(), ShellError> {
    let path = env.resolve(file);
    let opened = File::open(&path).and_then(|f| {
        if f.metadata()?.is_dir() {
            Err(io::Error::new(io::ErrorKind::InvalidInput, "is a directory"))
        } else {
            Ok(f)
        }
    });
    let handle = opened.map_err(|source| ShellError::InputRedirect {
        path: path.clone(),
        source,
    })?;

    log::info!("stdin is now redirected to read from '{}'", path.display());
    // The replaced source, if it was a file, is closed here.
    env.stdin = InputSource::Redirected { path, file: handle };
    Ok(())
}

/// Write the captured output of a command to `file`.
///
/// `None` means the command never produced a capture buffer; that is an error
/// and the target is left untouched. Returns the number of bytes written.
pub fn write_captured(
    captured: Option<&[u8]>,
    file: &str,
    mode: WriteMode,
    env: &Environment,
) -> Result<usize, ShellError> {
    let path = env.resolve(file);
    let Some(captured) = captured else {
        return Err(ShellError::NothingCaptured(path));
    };

    let mut options = OpenOptions::new();
    match mode {
        WriteMode::Truncate => options.write(true).truncate(true),
        WriteMode::Append => options.append(true),
    };
    let result = options
        .create(true)
        .open(&path)
        .and_then(|mut target| target.write_all(captured));
    result.map_err(|source| ShellError::OutputRedirect {
        path: path.clone(),
        source,
    })?;

    log::info!("wrote {} bytes to '{}' ({mode:?})", captured.len(), path.display());
    Ok(captured.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use std::io::Read;

    fn env_in(dir: &std::path::Path) -> Environment {
        Environment::with_vars(HashMap::new(), dir.to_path_buf())
    }

    #[test]
    fn input_is_rebound_to_file() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("in.txt"), "data\n").unwrap();
        let mut env = env_in(temp.path());

        rebind_input(&mut env, "in.txt").unwrap();

        assert_eq!(env.stdin.path(), Some(temp.path().join("in.txt").as_path()));
        let mut s = String::new();
        env.stdin.read_to_string(&mut s).unwrap();
        assert_eq!(s, "data\n");
    }

    #[test]
    fn failed_rebind_keeps_previous_source() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("first.txt"), "1").unwrap();
        let mut env = env_in(temp.path());
        rebind_input(&mut env, "first.txt").unwrap();

        let err = rebind_input(&mut env, "missing.txt").unwrap_err();

        assert!(matches!(err, ShellError::InputRedirect { .. }));
        assert_eq!(env.stdin.path(), Some(temp.path().join("first.txt").as_path()));
    }

    #[test]
    fn failed_rebind_keeps_inherited_source() {
        let temp = tempfile::tempdir().unwrap();
        let mut env = env_in(temp.path());

        assert!(rebind_input(&mut env, "missing.txt").is_err());
        assert!(matches!(env.stdin, InputSource::Inherited));
    }

    #[test]
    fn directory_cannot_be_bound_as_input() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        let mut env = env_in(temp.path());

        assert!(rebind_input(&mut env, "sub").is_err());
        assert!(matches!(env.stdin, InputSource::Inherited));
    }

    #[test]
    fn truncate_replaces_content() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("out.txt");
        fs::write(&target, "old content that is long\n").unwrap();
        let env = env_in(temp.path());

        let n = write_captured(Some(b"new\n"), "out.txt", WriteMode::Truncate, &env).unwrap();

        assert_eq!(n, 4);
        assert_eq!(fs::read_to_string(target).unwrap(), "new\n");
    }

    #[test]
    fn append_never_truncates() {
        let temp = tempfile::tempdir().unwrap();
        let env = env_in(temp.path());

        write_captured(Some(b"hi\n"), "log.txt", WriteMode::Append, &env).unwrap();
        write_captured(Some(b"hi\n"), "log.txt", WriteMode::Append, &env).unwrap();

        assert_eq!(
            fs::read_to_string(temp.path().join("log.txt")).unwrap(),
            "hi\nhi\n"
        );
    }

    #[test]
    fn empty_capture_with_truncate_empties_file() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("out.txt");
        fs::write(&target, "old").unwrap();
        let env = env_in(temp.path());

        write_captured(Some(b""), "out.txt", WriteMode::Truncate, &env).unwrap();

        assert_eq!(fs::read_to_string(target).unwrap(), "");
    }

    #[test]
    fn missing_capture_leaves_target_untouched() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("out.txt");
        fs::write(&target, "keep").unwrap();
        let env = env_in(temp.path());

        let err = write_captured(None, "out.txt", WriteMode::Truncate, &env).unwrap_err();

        assert!(matches!(err, ShellError::NothingCaptured(_)));
        assert_eq!(fs::read_to_string(target).unwrap(), "keep");
        assert!(!temp.path().join("other.txt").exists());
    }

    #[test]
    fn unwritable_target_is_reported() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("dir")).unwrap();
        let env = env_in(temp.path());

        let err = write_captured(Some(b"x"), "dir", WriteMode::Truncate, &env).unwrap_err();
        assert!(matches!(err, ShellError::OutputRedirect { .. }));
    }
}
