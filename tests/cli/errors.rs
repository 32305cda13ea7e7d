//! Tests for error handling and CLI flags.

use crate::support::*;

#[test]
fn test_help_lists_commands() {
    let t = Test::new();

    let output = t.cmd().arg("--help").output().unwrap();
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("inject"));
    assert!(out.contains("scan"));
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();

    let output = t.cmd().arg("unknown-command").output().unwrap();
    assert_failure(&output);
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    let output = t.cmd().arg("--version").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "dotinject");
}

#[test]
fn test_missing_path_fails() {
    let t = Test::new();

    let output = t.inject("nope.tmpl", &[]);
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "path not found");
}

#[test]
fn test_unknown_format_rejected() {
    let t = Test::new();
    t.write("a.tmpl", "${X}\n");

    let output = t.inject("a.tmpl", &["--format", "jinja"]);
    assert_failure(&output);
}

#[test]
fn test_completions_bash_outputs_script() {
    let t = Test::new();

    let output = t.cmd().args(["completions", "bash"]).output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "dotinject");
}

#[test]
fn test_completions_zsh() {
    let t = Test::new();

    let output = t.cmd().args(["completions", "zsh"]).output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "#compdef dotinject");
}
