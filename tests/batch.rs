#![cfg(unix)]

use myshell::Interpreter;
use myshell::env::Environment;
use myshell::io_adapters::CaptureBuffer;
use myshell::lexer::TokenTable;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use std::process::{Command, Output};

fn myshell(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_myshell"))
        .args(args)
        .current_dir(dir)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run myshell")
}

fn run_batch(dir: &Path, script: &str) -> Output {
    fs::write(dir.join("script.txt"), script).unwrap();
    myshell(dir, &["--no-banner", "script.txt"])
}

#[test]
fn batch_file_runs_every_line() {
    let temp = tempfile::tempdir().unwrap();

    let out = run_batch(
        temp.path(),
        "echo first > notes.txt\necho second >> notes.txt\ntrue\n",
    );

    assert!(out.status.success());
    assert_eq!(
        fs::read_to_string(temp.path().join("notes.txt")).unwrap(),
        "first\nsecond\n"
    );
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "Child exited with status 0\n"
    );
}

#[test]
fn missing_batch_file_is_fatal() {
    let temp = tempfile::tempdir().unwrap();

    let out = myshell(temp.path(), &["does-not-exist.txt"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("cannot open batch file"));
}

#[test]
fn errors_are_reported_and_session_continues() {
    let temp = tempfile::tempdir().unwrap();

    let out = run_batch(temp.path(), "cd /does/not/exist\n>\necho still here\n");

    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("cd: /does/not/exist"), "{stderr}");
    assert!(stderr.contains("invalid command"), "{stderr}");
    assert_eq!(String::from_utf8_lossy(&out.stdout), "still here\n");
}

#[test]
fn children_see_shell_and_parent_variables() {
    let temp = tempfile::tempdir().unwrap();
    let exe = fs::canonicalize(env!("CARGO_BIN_EXE_myshell")).unwrap();

    let out = run_batch(temp.path(), "env > env.txt\n");

    assert!(out.status.success());
    let vars = fs::read_to_string(temp.path().join("env.txt")).unwrap();
    assert!(vars.lines().any(|l| l == format!("parent={}", exe.display())), "{vars}");
    assert!(vars.lines().any(|l| l == format!("shell={}", exe.display())), "{vars}");
}

#[test]
fn cd_persists_for_following_lines() {
    let temp = tempfile::tempdir().unwrap();
    fs::create_dir(temp.path().join("sub")).unwrap();
    fs::write(temp.path().join("sub").join("inside.txt"), "").unwrap();

    let out = run_batch(temp.path(), "cd sub\ndir > ../listing.txt\n");

    assert!(out.status.success());
    assert_eq!(
        fs::read_to_string(temp.path().join("listing.txt")).unwrap(),
        ".\n..\ninside.txt\n"
    );
}

#[test]
fn quit_and_exit_stop_the_session() {
    let temp = tempfile::tempdir().unwrap();

    let out = run_batch(temp.path(), "quit\necho unreachable > a.txt\n");
    assert!(out.status.success());
    assert!(!temp.path().join("a.txt").exists());

    let out = run_batch(temp.path(), "exit\necho unreachable > b.txt\n");
    assert!(out.status.success());
    assert!(!temp.path().join("b.txt").exists());
}

#[test]
fn banner_is_printed_by_default() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("empty.txt"), "").unwrap();

    let out = myshell(temp.path(), &["empty.txt"]);

    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).starts_with("Welcome to myshell"));
}

#[test]
fn interpreter_runs_batch_file() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("words.txt"), "pear\nfig\n").unwrap();
    fs::write(
        temp.path().join("batch.txt"),
        "sort < words.txt > sorted.txt\necho sorted\nfalse\n",
    )
    .unwrap();

    let vars = HashMap::from([("PATH".to_string(), "/usr/bin:/bin".to_string())]);
    let mut sh = Interpreter::new(
        Environment::with_vars(vars, temp.path().to_path_buf()),
        TokenTable::default(),
    );
    let script = BufReader::new(File::open(temp.path().join("batch.txt")).unwrap());
    let mut out = CaptureBuffer::new();
    sh.run_script(script, &mut out).unwrap();

    assert_eq!(
        String::from_utf8(out.into_bytes()).unwrap(),
        "Child exited with status 0\nsorted\nChild exited with status 1\n"
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("sorted.txt")).unwrap(),
        "fig\npear\n"
    );
}
