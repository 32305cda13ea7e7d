//! Tests for config file and environment layering.

use crate::support::*;

#[test]
fn test_config_file_sets_format_and_suffixes() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    let config = t.write(
        "dotinject.toml",
        "format = \"custom\"\nsuffixes = [\".in\"]\nbackup = false\n",
    );
    t.write("rc.in", "a=%%DI_API_KEY%% b=${DI_API_KEY}\n");

    let output = t
        .cmd()
        .arg("--config")
        .arg(&config)
        .args(["inject", "rc.in"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(t.read("rc"), "a=sk-test-12345 b=${DI_API_KEY}\n");
}

#[test]
fn test_config_from_env_var() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    let config = t.write("custom.toml", "field = \"username\"\n");
    t.write("u.tmpl", "user=${DI_API_KEY}\n");

    let output = t
        .cmd()
        .env("DOTINJECT_CONFIG", &config)
        .args(["inject", "u.tmpl"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(t.read("u"), "user=svc-account\n");
}

#[test]
fn test_flag_overrides_config_file() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    let config = t.write("c.toml", "field = \"username\"\n");
    t.write("u.tmpl", "user=${DI_API_KEY}\n");

    let output = t
        .cmd()
        .arg("--config")
        .arg(&config)
        .args(["inject", "u.tmpl", "--field", "credential"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(t.read("u"), "user=sk-test-12345\n");
}

#[test]
fn test_missing_explicit_config_fails() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    t.write("a.tmpl", "${DI_API_KEY}\n");

    let output = t
        .cmd()
        .args(["--config", "does-not-exist.toml", "inject", "a.tmpl"])
        .output()
        .unwrap();
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "failed to read config file");
    assert!(!t.exists("a"));
}

#[test]
fn test_invalid_config_fails() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    let config = t.write("bad.toml", "colour = \"red\"\n");

    let output = t
        .cmd()
        .arg("--config")
        .arg(&config)
        .args(["check"])
        .output()
        .unwrap();
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "failed to parse config file");
}

#[cfg(target_os = "linux")]
#[test]
fn test_default_config_location() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    t.write_config("vault = \"Employee\"\n");

    let output = t.check(&[]);
    assert_success(&output);
    assert_stderr_contains(&output, "Employee");
}

#[test]
fn test_unknown_store_in_env_fails() {
    let t = Test::new();

    let output = t.cmd().env("DOTINJECT_STORE", "lastpass").arg("check").output().unwrap();
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "unknown secret store: lastpass");
}

#[test]
fn test_check_env_store_is_ready() {
    let t = Test::new();

    let output = t.check(&[]);
    assert_success(&output);
    assert_stderr_contains(&output, "env is ready");
}

#[test]
fn test_check_missing_op_cli() {
    let t = Test::new();

    let output = t
        .cmd()
        .env("PATH", "")
        .args(["check", "--store", "op"])
        .output()
        .unwrap();
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "install the 1Password CLI");
}
