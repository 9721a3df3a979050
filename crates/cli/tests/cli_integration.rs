use std::io::Write;
use std::process::{Command, Output, Stdio};

fn bugle() -> Command {
    Command::new(env!("CARGO_BIN_EXE_bugle"))
}

fn run_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = bugle()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn bugle");
    child
        .stdin
        .take()
        .expect("stdin was piped")
        .write_all(stdin.as_bytes())
        .expect("failed to write to bugle stdin");
    child.wait_with_output().expect("failed to wait for bugle")
}

fn parsed_json(out: &Output) -> serde_json::Value {
    assert!(
        out.status.success(),
        "bugle failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stderr),
    );
    serde_json::from_slice(&out.stdout).expect("stdout was not valid JSON")
}

#[test]
fn dispatches_subcommand_and_reports_namespace() {
    let out = run_with_stdin(&["-c", "gentoo", "get", "-B", "42", "7"], "");
    let json = parsed_json(&out);
    assert_eq!(json["command"], "get");
    assert_eq!(json["connection"], "gentoo");
    assert_eq!(json["browser"], true);
    assert_eq!(json["ids"], serde_json::json!([42, 7]));
}

#[test]
fn piped_ids_replace_the_placeholder() {
    let out = run_with_stdin(&["get", "-"], "12\n34\n");
    let json = parsed_json(&out);
    assert_eq!(json["ids"], serde_json::json!([12, 34]));
}

#[test]
fn search_terms_come_from_stdin_too() {
    let out = run_with_stdin(&["search", "-"], "segfault on start\n");
    let json = parsed_json(&out);
    assert_eq!(json["terms"], serde_json::json!(["segfault on start"]));
}

#[test]
fn conflicting_options_exit_one() {
    let out = run_with_stdin(&["get", "1", "--browser", "--url"], "");
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("not allowed with"), "unexpected stderr:\n{stderr}");
}

#[test]
fn unrecognized_arguments_exit_two() {
    let out = run_with_stdin(&["get", "1", "--bogus"], "");
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("--bogus"), "unexpected stderr:\n{stderr}");
}

#[test]
fn unknown_subcommand_exits_two() {
    let out = run_with_stdin(&["frobnicate"], "");
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("unknown subcommand"),
        "unexpected stderr:\n{stderr}"
    );
}

#[test]
fn missing_subcommand_exits_two() {
    let out = run_with_stdin(&[], "");
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn invalid_id_is_a_usage_error() {
    let out = run_with_stdin(&["get", "twelve"], "");
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("twelve"), "unexpected stderr:\n{stderr}");
}
