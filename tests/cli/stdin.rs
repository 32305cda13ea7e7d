//! Tests for rendering standard input.

use crate::support::*;

#[test]
fn test_stdin_to_stdout() {
    let t = Test::with_secrets(STANDARD_SECRETS);

    let output = t.inject_stdin(GITCONFIG_TEMPLATE, &[]);
    assert_success(&output);
    assert_eq!(stdout(&output), GITCONFIG_RENDERED);
}

#[test]
fn test_stdin_to_output_file() {
    let t = Test::with_secrets(STANDARD_SECRETS);

    let output = t.inject_stdin(NPMRC_TEMPLATE, &["--output", ".npmrc"]);
    assert_success(&output);
    assert!(stdout(&output).is_empty());
    assert_eq!(
        t.read(".npmrc"),
        "//registry.npmjs.org/:_authToken=npm_test_abcdef\n"
    );
}

#[test]
fn test_stdin_without_tokens_passes_through() {
    let t = Test::with_secrets(STANDARD_SECRETS);

    let output = t.inject_stdin("plain text\n", &[]);
    assert_success(&output);
    assert_eq!(stdout(&output), "plain text\n");
}

#[test]
fn test_stdin_ambiguous_fails() {
    let t = Test::with_secrets(STANDARD_SECRETS);

    let output = t.inject_stdin(AMBIGUOUS_TEMPLATE, &[]);
    assert_exit_code(&output, 1);
    assert!(stdout(&output).is_empty());
    assert_stderr_contains(&output, "ambiguous");
}

#[test]
fn test_stdin_dry_run_is_redacted() {
    let t = Test::with_secrets(STANDARD_SECRETS);

    let output = t.inject_stdin("t=${DI_API_KEY}\n", &["--dry-run"]);
    assert_success(&output);
    assert_stdout_contains(&output, "+t=********");
    assert_no_leak(&output, "sk-test-12345");
}

#[test]
fn test_stdin_without_tokens_skips_store_check() {
    let t = Test::new();

    // With an empty PATH the 1Password CLI cannot be found; plain content
    // never needs it.
    let output = t
        .cmd()
        .env("PATH", "")
        .args(["inject", "-", "--store", "onepassword"])
        .write_stdin("plain text\n")
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(stdout(&output), "plain text\n");
}
