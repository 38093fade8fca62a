// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use savehook_core::{ExecutionResult, FileIdentity};
use serial_test::serial;
use std::time::Duration;

fn no_color() {
    std::env::set_var("NO_COLOR", "1");
    std::env::remove_var("COLOR");
}

fn failed_report() -> Report {
    let result = ExecutionResult::exited(
        7,
        "main.go:3:1: expected declaration\nmain.go:4:1: missing brace\n".to_string(),
        Duration::from_millis(15),
    );
    Report::from_execution(FileIdentity::new("/proj/main.go"), "fmt", result)
}

#[test]
#[serial]
fn text_puts_output_under_summary() {
    no_color();
    let text = report_text(&failed_report());
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("non_zero_exit "), "{:?}", lines[0]);
    assert!(lines[0].ends_with("fmt failed on main.go: exit code 7"));
    assert_eq!(lines[1], "  main.go:3:1: expected declaration");
    assert_eq!(lines[2], "  main.go:4:1: missing brace");
}

#[test]
#[serial]
fn text_success_is_single_line() {
    no_color();
    let result = ExecutionResult::exited(0, String::new(), Duration::from_millis(3));
    let report = Report::from_execution(FileIdentity::new("/proj/main.go"), "fmt", result);

    let text = report_text(&report);
    assert_eq!(text.lines().count(), 1);
    assert!(text.starts_with("success "));
}

#[test]
fn json_is_one_line_with_outcome() {
    let line = report_json(&failed_report()).unwrap();
    assert!(!line.contains('\n'));

    let value: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(value["outcome"], "non_zero_exit");
    assert_eq!(value["exit_code"], 7);
    assert_eq!(value["file"]["path"], "/proj/main.go");
}

#[test]
#[serial]
fn skipped_line_in_both_formats() {
    no_color();
    let text = skipped(Path::new("/proj/notes.txt"), OutputFormat::Text).unwrap();
    assert!(text.starts_with("skipped "));
    assert!(text.contains("/proj/notes.txt"));

    let json = skipped(Path::new("/proj/notes.txt"), OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["outcome"], "skipped");
    assert_eq!(value["file"], "/proj/notes.txt");
}

#[test]
fn format_or_json_text_branch_calls_closure() {
    let mut called = false;
    format_or_json(OutputFormat::Text, &serde_json::json!({}), || called = true).unwrap();
    assert!(called);
}

#[tokio::test]
async fn terminal_sink_delivers() {
    let sink = TerminalSink::new(OutputFormat::Json);
    assert!(sink.deliver(&failed_report()).await.is_ok());
}
