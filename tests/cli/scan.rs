//! Tests for the scan command.

use crate::support::*;

#[test]
fn test_scan_lists_tokens_without_secrets() {
    // No secrets are configured; scanning never resolves anything.
    let t = Test::new();
    t.write("creds.tpl", GO_TEMPLATE);

    let output = t.scan("creds.tpl", &[]);
    assert_success(&output);
    let err = stderr(&output);
    assert!(err.contains("creds.tpl (go)"), "got: {}", err);
    assert!(err.contains("Work/DI_API_KEY/username"));
    assert!(err.contains("Personal/DI_API_KEY/credential"));
}

#[test]
fn test_scan_json() {
    let t = Test::new();
    t.write("dots/a.tmpl", "${DI_A} ${DI_B} ${DI_A}\n");
    t.write("dots/b.tmpl", "nothing\n");

    let output = t.scan("dots", &["--json", "--vault", "Employee"]);
    assert_success(&output);

    let entries: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["format"], "env");
    let tokens = entries[0]["tokens"].as_array().unwrap();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0]["raw"], "${DI_A}");
    assert_eq!(tokens[0]["vault"], "Employee");
    assert_eq!(tokens[1]["name"], "DI_B");
    assert!(entries[1]["format"].is_null());
}

#[test]
fn test_scan_ambiguous_exits_nonzero() {
    let t = Test::new();
    t.write("mixed.tmpl", AMBIGUOUS_TEMPLATE);

    let output = t.scan("mixed.tmpl", &[]);
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "ambiguous (env, double-brace)");
}

#[test]
fn test_scan_stdin() {
    let t = Test::new();

    let output = t
        .cmd()
        .args(["scan", "-", "--json"])
        .write_stdin("x=%%DI_TOKEN%%\n")
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "\"format\": \"custom\"");
    assert_stdout_contains(&output, "\"name\": \"DI_TOKEN\"");
}

#[test]
fn test_scan_unreadable_file_does_not_stop_siblings() {
    let t = Test::new();
    t.write("dots/b.tmpl", "${DI_B}\n");
    std::fs::write(t.path("dots/a.tmpl"), b"x=\xff\xfe\n").unwrap();

    let output = t.scan("dots", &[]);
    assert_exit_code(&output, 1);
    let err = stderr(&output);
    assert!(err.contains("a.tmpl: read error"), "got: {}", err);
    assert!(err.contains("b.tmpl (env)"), "got: {}", err);
    assert!(err.contains("DI_B"));

    let output = t.scan("dots", &["--json"]);
    assert_exit_code(&output, 1);
    let entries: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries[0]["error"].as_str().unwrap().starts_with("read error"));
    assert_eq!(entries[1]["format"], "env");
    assert!(entries[1].get("error").is_none());
}
