// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `savehook run`: one save in, one report out.

use crate::prelude::*;

fn project_with_tool(script: &str, timeout_ms: u64) -> Project {
    let temp = Project::empty();
    temp.config(&format!(
        r#"
[tool]
executable = "/bin/sh"
args = ["-c", '{script}']
timeout_ms = {timeout_ms}

[filter]
file_type = "Go"
"#
    ));
    temp.file("main.go", "package main\n");
    temp.file("notes.txt", "hello\n");
    temp
}

#[test]
fn successful_run_prints_report() {
    let temp = project_with_tool(r#"echo "checked $(basename "$0")""#, 5000);
    temp.savehook()
        .args(&["run", "main.go"])
        .passes()
        .stdout_has("success")
        .stdout_has("sh succeeded on main.go")
        .stdout_has("  checked main.go");
}

#[test]
fn failing_tool_exits_one_with_combined_output() {
    let temp = project_with_tool(r#"echo "main.go:1: bad token" >&2; exit 3"#, 5000);
    temp.savehook()
        .args(&["run", "main.go"])
        .exits(1)
        .stdout_has("non_zero_exit")
        .stdout_has("sh failed on main.go: exit code 3")
        .stdout_has("main.go:1: bad token");
}

#[test]
fn slow_tool_times_out() {
    let temp = project_with_tool("sleep 5", 200);
    temp.savehook().args(&["run", "main.go"]).exits(1).stdout_has("timed_out");
}

#[test]
fn missing_tool_is_launch_failure() {
    let temp = Project::empty();
    temp.config("[tool]\nexecutable = \"/nonexistent/savehook-tool\"\n[filter]\nfile_type = \"Go\"\n");
    temp.file("main.go", "package main\n");

    temp.savehook().args(&["run", "main.go"]).exits(1).stdout_has("launch_failed");
}

#[test]
fn irrelevant_file_is_skipped() {
    let temp = project_with_tool("exit 9", 5000);
    temp.savehook()
        .args(&["run", "notes.txt"])
        .passes()
        .stdout_has("skipped")
        .stdout_lacks("non_zero_exit");
}

#[test]
fn file_type_flag_overrides_extension_map() {
    let temp = project_with_tool("exit 0", 5000);
    temp.savehook().args(&["run", "notes.txt", "--file-type", "Go"]).passes().stdout_has("success");
}

#[test]
fn json_report_is_one_line() {
    let temp = project_with_tool("exit 0", 5000);
    let output = temp.savehook().args(&["--format", "json", "run", "main.go"]).passes();
    let reports = output.json_lines();

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["outcome"], "success");
    assert_eq!(reports[0]["exit_code"], 0);
    assert!(reports[0]["file"]["path"].as_str().unwrap().ends_with("main.go"));
}

#[test]
fn workspace_working_dir_runs_in_module_root() {
    let temp = Project::empty();
    temp.config(
        r#"
[tool]
executable = "/bin/sh"
args = ["-c", "pwd -P"]
working_dir = "workspace"

[filter]
file_type = "Go"

[workspace]
markers = ["go.mod"]
"#,
    );
    temp.file("svc/go.mod", "module svc\n");
    temp.file("svc/pkg/util.go", "package pkg\n");

    let expected = std::fs::canonicalize(temp.path().join("svc")).unwrap();
    temp.savehook()
        .args(&["run", "svc/pkg/util.go"])
        .passes()
        .stdout_has(&format!("  {}", expected.display()));
}

#[test]
fn executable_can_come_from_environment() {
    let temp = Project::empty();
    temp.config("[tool]\nargs = [\"-c\", \"echo from-env\"]\n[filter]\nfile_type = \"Go\"\n");
    temp.file("main.go", "package main\n");

    temp.savehook()
        .env("SAVEHOOK_EXECUTABLE", "/bin/sh")
        .args(&["run", "main.go"])
        .passes()
        .stdout_has("from-env");
}

#[test]
fn missing_configuration_exits_two() {
    let temp = Project::empty();
    temp.file("main.go", "package main\n");

    temp.savehook()
        .args(&["run", "main.go"])
        .exits(2)
        .stderr_has("no configuration found");
}
