use std::process::{Command, Output};
use tempfile::TempDir;

fn run_sitecap(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sitecap"))
        .current_dir(dir.path())
        .args(args)
        .output()
        .expect("run sitecap")
}

fn file_count(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path()).expect("read dir").count()
}

#[test]
fn missing_arguments_print_usage_and_exit_cleanly() {
    let dir = TempDir::new().expect("tempdir");
    let output = run_sitecap(&dir, &["http://example.com", "5", "800", "600"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.starts_with("usage: sitecap <url> <delay> <width> <height>"),
        "expected usage line, got: {stdout}"
    );
    assert_eq!(file_count(&dir), 0, "no capture should have happened");
}

#[test]
fn no_arguments_print_usage() {
    let dir = TempDir::new().expect("tempdir");
    let output = run_sitecap(&dir, &[]);

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("<parent pid>"));
}

#[test]
fn eight_arguments_are_still_too_few() {
    let dir = TempDir::new().expect("tempdir");
    let output = run_sitecap(
        &dir,
        &["http://example.com", "5", "800", "600", "false", "true", "png", "white"],
    );

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("usage:"));
}

#[test]
fn non_numeric_width_is_fatal() {
    let dir = TempDir::new().expect("tempdir");
    let output = run_sitecap(
        &dir,
        &["http://example.com", "5", "wide", "600", "false", "true", "png", "white", "1234"],
    );

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid width: wide"), "got: {stderr}");
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("usage:"));
    assert_eq!(file_count(&dir), 0);
}

#[test]
fn negative_value_among_too_few_arguments_prints_usage() {
    let dir = TempDir::new().expect("tempdir");
    let output = run_sitecap(&dir, &["http://example.com", "-5"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("usage:"));
    assert!(output.stderr.is_empty());
}

#[test]
fn negative_width_is_fatal() {
    let dir = TempDir::new().expect("tempdir");
    let output = run_sitecap(
        &dir,
        &["http://example.com", "5", "-800", "600", "false", "true", "png", "white", "1234"],
    );

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid width: -800"), "got: {stderr}");
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("usage:"));
    assert_eq!(file_count(&dir), 0);
}

#[test]
fn oversized_delay_is_fatal() {
    let dir = TempDir::new().expect("tempdir");
    let output = run_sitecap(
        &dir,
        &["http://example.com", "1e20", "800", "600", "false", "false", "png", "white", "1"],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Delay is too large"));
}

#[test]
fn zero_retry_delay_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let output = run_sitecap(
        &dir,
        &["--retry-delay", "0", "http://example.com", "5", "800", "600", "false", "false", "png", "white", "1"],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--retry-delay"));
    assert_eq!(file_count(&dir), 0);
}

#[test]
fn zero_delay_is_fatal() {
    let dir = TempDir::new().expect("tempdir");
    let output = run_sitecap(
        &dir,
        &["http://example.com", "0", "800", "600", "false", "false", "png", "white", "1"],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Delay must be a positive"));
}

#[test]
fn missing_browser_binary_reports_remediation() {
    let dir = TempDir::new().expect("tempdir");
    let output = run_sitecap(
        &dir,
        &[
            "--chrome",
            "/definitely/not/a/chrome",
            "http://example.com",
            "5",
            "800",
            "600",
            "false",
            "true",
            "png",
            "white",
            "1234",
        ],
    );

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to launch browser"), "got: {stderr}");
    assert!(stderr.contains("Hint:"), "got: {stderr}");
    assert_eq!(file_count(&dir), 0);
}

#[test]
fn help_lists_optional_flags() {
    let dir = TempDir::new().expect("tempdir");
    let output = run_sitecap(&dir, &["--help"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in ["--max-retries", "--retry-delay", "--nav-timeout", "--chrome", "--output-dir"] {
        assert!(stdout.contains(flag), "help should mention {flag}");
    }
}
