// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `savehook check`.

use crate::prelude::*;

const VALID: &str = r#"
[tool]
executable = "/usr/local/bin/fmt"
args = ["-l", "-w"]
timeout_ms = 1500

[filter]
file_type = "Go"
"#;

#[test]
fn valid_config_prints_command_line() {
    let temp = Project::empty();
    temp.config(VALID);

    temp.savehook()
        .args(&["check"])
        .passes()
        .stdout_has("command: /usr/local/bin/fmt -l -w <file>")
        .stdout_has("timeout: 1500ms")
        .stdout_has("savehook.toml");
}

#[test]
fn json_summary() {
    let temp = Project::empty();
    temp.config(VALID);

    let output = temp.savehook().args(&["--format", "json", "check"]).passes();
    let summary: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(summary["command"], "/usr/local/bin/fmt -l -w");
    assert_eq!(summary["timeout_ms"], 1500);
    assert_eq!(summary["settings"]["pipeline"]["overlap"], "queue");
}

#[test]
fn explicit_config_flag() {
    let temp = Project::empty();
    temp.file("conf/tools.toml", VALID);

    temp.savehook().args(&["check", "--config", "conf/tools.toml"]).passes().stdout_has("tools.toml");
}

#[test]
fn missing_executable_exits_two() {
    let temp = Project::empty();
    temp.config("[filter]\nfile_type = \"Go\"\n");

    temp.savehook()
        .args(&["check"])
        .exits(2)
        .stderr_has("configuration error")
        .stdout_eq("");
}

#[test]
fn zero_timeout_exits_two() {
    let temp = Project::empty();
    temp.config("[tool]\nexecutable = \"fmt\"\ntimeout_ms = 0\n");

    temp.savehook().args(&["check"]).exits(2).stderr_has("timeout must be greater than zero");
}

#[test]
fn unknown_key_exits_two() {
    let temp = Project::empty();
    temp.config("[tool]\nexecutabel = \"fmt\"\n");

    temp.savehook().args(&["check"]).exits(2).stderr_has("failed to parse config");
}

#[test]
fn bad_timeout_override_exits_two() {
    let temp = Project::empty();
    temp.config(VALID);

    temp.savehook().env("SAVEHOOK_TIMEOUT_MS", "soon").args(&["check"]).exits(2);
}
