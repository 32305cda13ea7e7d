//! Tests for rendering single template files.

use crate::support::*;

#[test]
fn test_inject_renders_template_next_to_input() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    t.write(".gitconfig.tmpl", GITCONFIG_TEMPLATE);

    let output = t.inject(".gitconfig.tmpl", &[]);
    assert_success(&output);
    assert_eq!(t.read(".gitconfig"), GITCONFIG_RENDERED);
    assert_eq!(t.read(".gitconfig.tmpl"), GITCONFIG_TEMPLATE);
    assert_stderr_contains(&output, "1 secret");
    assert_no_leak(&output, "ghp_test_0123456789");
}

#[test]
fn test_inject_custom_format() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    t.write(".npmrc.template", NPMRC_TEMPLATE);

    let output = t.inject(".npmrc.template", &[]);
    assert_success(&output);
    assert_eq!(
        t.read(".npmrc"),
        "//registry.npmjs.org/:_authToken=npm_test_abcdef\n"
    );
}

#[test]
fn test_inject_go_format_with_vault_and_field() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    t.write("creds.tpl", GO_TEMPLATE);

    let output = t.inject("creds.tpl", &[]);
    assert_success(&output);
    assert_eq!(t.read("creds"), "user=svc-account\nkey=sk-test-12345\n");
}

#[test]
fn test_inject_double_brace_and_env_simple() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    t.write("a.tmpl", "token: {{ DI_API_KEY }}\n");
    t.write("b.tmpl", "export TOKEN=$DI_API_KEY\n");

    assert_success(&t.inject("a.tmpl", &[]));
    assert_success(&t.inject("b.tmpl", &[]));
    assert_eq!(t.read("a"), "token: sk-test-12345\n");
    assert_eq!(t.read("b"), "export TOKEN=sk-test-12345\n");
}

#[test]
fn test_inject_repeated_token_everywhere() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    t.write("x.tmpl", "${DI_API_KEY}:${DI_API_KEY}:${DI_API_KEY}\n");

    assert_success(&t.inject("x.tmpl", &[]));
    assert_eq!(t.read("x"), "sk-test-12345:sk-test-12345:sk-test-12345\n");
}

#[test]
fn test_inject_value_with_spaces_and_symbols() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    t.write("db.tmpl", "password=\"${DI_DB_PASSWORD}\"\n");

    assert_success(&t.inject("db.tmpl", &[]));
    assert_eq!(t.read("db"), "password=\"p@ss w0rd\"\n");
}

#[test]
fn test_inject_in_place_makes_backup() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    t.write("settings.conf", "key=%%DI_API_KEY%%\n");

    let output = t.inject("settings.conf", &[]);
    assert_success(&output);
    assert_eq!(t.read("settings.conf"), "key=sk-test-12345\n");

    let backups = t.files_starting_with("settings.conf.bak.");
    assert_eq!(backups.len(), 1, "expected one backup, found {:?}", backups);
    assert_eq!(t.read(&backups[0]), "key=%%DI_API_KEY%%\n");
}

#[test]
fn test_inject_existing_output_requires_force() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    t.write(".gitconfig.tmpl", GITCONFIG_TEMPLATE);
    t.write(".gitconfig", "hand edited\n");

    let output = t.inject(".gitconfig.tmpl", &[]);
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "output exists");
    assert_eq!(t.read(".gitconfig"), "hand edited\n");

    let output = t.inject(".gitconfig.tmpl", &["--force"]);
    assert_success(&output);
    assert_eq!(t.read(".gitconfig"), GITCONFIG_RENDERED);

    let backups = t.files_starting_with(".gitconfig.bak.");
    assert_eq!(backups.len(), 1);
    assert_eq!(t.read(&backups[0]), "hand edited\n");
}

#[test]
fn test_inject_force_without_backup() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    t.write(".gitconfig.tmpl", GITCONFIG_TEMPLATE);
    t.write(".gitconfig", "old\n");

    let output = t.inject(".gitconfig.tmpl", &["--force", "--no-backup"]);
    assert_success(&output);
    assert!(t.files_starting_with(".gitconfig.bak.").is_empty());
}

#[test]
fn test_inject_twice_reports_unchanged() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    t.write(".gitconfig.tmpl", GITCONFIG_TEMPLATE);

    assert_success(&t.inject(".gitconfig.tmpl", &[]));
    let output = t.inject(".gitconfig.tmpl", &[]);
    assert_success(&output);
    assert_stderr_contains(&output, "unchanged");
    assert!(t.files_starting_with(".gitconfig.bak.").is_empty());
}

#[test]
fn test_inject_strict_fails_on_missing_secret() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    t.write("app.tmpl", "a=${DI_API_KEY}\nb=${DI_NOT_DEFINED}\n");

    let output = t.inject("app.tmpl", &[]);
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "DI_NOT_DEFINED");
    assert_stderr_contains(&output, "not found");
    assert!(!t.exists("app"));
}

#[test]
fn test_inject_best_effort_leaves_token() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    t.write("app.tmpl", "a=${DI_API_KEY}\nb=${DI_NOT_DEFINED}\n");

    let output = t.inject("app.tmpl", &["--best-effort"]);
    assert_success(&output);
    assert_stderr_contains(&output, "unresolved DI_NOT_DEFINED");
    assert_eq!(t.read("app"), "a=sk-test-12345\nb=${DI_NOT_DEFINED}\n");
}

#[test]
fn test_inject_explicit_output() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    t.write("template.txt", GITCONFIG_TEMPLATE);

    let output = t.inject("template.txt", &["--output", "rendered/gitconfig"]);
    // The parent directory does not exist yet
    assert_failure(&output);

    std::fs::create_dir(t.path("rendered")).unwrap();
    let output = t.inject("template.txt", &["-o", "rendered/gitconfig"]);
    assert_success(&output);
    assert_eq!(t.read("rendered/gitconfig"), GITCONFIG_RENDERED);
    assert_eq!(t.read("template.txt"), GITCONFIG_TEMPLATE);
}

#[test]
fn test_inject_format_flag_overrides_detection() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    t.write("mixed.tmpl", AMBIGUOUS_TEMPLATE);

    let output = t.inject("mixed.tmpl", &["--format", "env"]);
    assert_success(&output);
    assert_eq!(t.read("mixed"), "a=sk-test-12345\nb={{DI_API_KEY}}\n");
}

#[test]
fn test_inject_file_without_tokens_is_noop() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    t.write("plain.tmpl", "nothing here\n");

    let output = t.inject("plain.tmpl", &[]);
    assert_success(&output);
    assert_stderr_contains(&output, "no tokens");
    assert!(!t.exists("plain"));
}

#[cfg(unix)]
#[test]
fn test_inject_keeps_private_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let t = Test::with_secrets(STANDARD_SECRETS);
    let input = t.write("ssh_config.tmpl", "IdentityAgent %%DI_API_KEY%%\n");
    std::fs::set_permissions(&input, std::fs::Permissions::from_mode(0o600)).unwrap();

    assert_success(&t.inject("ssh_config.tmpl", &[]));
    let mode = std::fs::metadata(t.path("ssh_config"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}
