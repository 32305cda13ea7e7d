//! Tests for directory and recursive runs.

use crate::support::*;

#[test]
fn test_batch_with_one_ambiguous_file() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    t.write("dots/a.tmpl", "key=${DI_API_KEY}\n");
    t.write("dots/b.tmpl", AMBIGUOUS_TEMPLATE);
    t.write("dots/c.tmpl", "key=%%DI_API_KEY%%\n");

    let output = t.inject("dots", &[]);
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "ambiguous");
    assert_stderr_contains(&output, "2 succeeded, 1 failed");

    assert_eq!(t.read("dots/a"), "key=sk-test-12345\n");
    assert_eq!(t.read("dots/c"), "key=sk-test-12345\n");
    assert!(!t.exists("dots/b"));
}

#[test]
fn test_batch_ignores_non_template_files() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    t.write("dots/a.tmpl", "key=${DI_API_KEY}\n");
    t.write("dots/README.md", "uses ${DI_API_KEY}\n");

    assert_success(&t.inject("dots", &[]));
    assert_eq!(t.read("dots/README.md"), "uses ${DI_API_KEY}\n");
}

#[test]
fn test_batch_recursive() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    t.write("dots/top.tmpl", "${DI_API_KEY}\n");
    t.write("dots/nested/deep.template", "${DI_NPM_TOKEN}\n");
    t.write("dots/.git/hook.tmpl", "${DI_API_KEY}\n");

    assert_success(&t.inject("dots", &[]));
    assert!(t.exists("dots/top"));
    assert!(!t.exists("dots/nested/deep"));

    assert_success(&t.inject("dots", &["--recursive", "--force"]));
    assert_eq!(t.read("dots/nested/deep"), "npm_test_abcdef\n");
    assert!(!t.exists("dots/.git/hook"));
}

#[test]
fn test_batch_failure_does_not_stop_siblings() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    t.write("dots/a.tmpl", "${DI_NOT_DEFINED}\n");
    t.write("dots/b.tmpl", "${DI_API_KEY}\n");

    let output = t.inject("dots", &[]);
    assert_exit_code(&output, 1);
    assert!(!t.exists("dots/a"));
    assert_eq!(t.read("dots/b"), "sk-test-12345\n");
}

#[test]
fn test_output_flag_rejected_for_directory() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    t.write("dots/a.tmpl", "${DI_API_KEY}\n");

    let output = t.inject("dots", &["--output", "out"]);
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "--output only applies to single files");
    assert!(!t.exists("out"));
}

#[test]
fn test_empty_directory_succeeds() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    std::fs::create_dir(t.path("empty")).unwrap();

    assert_success(&t.inject("empty", &[]));
}
