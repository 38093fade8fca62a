// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI help output specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    cli().args(&["--help"]).passes().stdout_has("Usage:").stdout_has("run").stdout_has("watch").stdout_has("check");
}

#[test]
fn no_args_shows_usage_and_fails() {
    cli().exits(2).stderr_has("Usage:");
}

#[test]
fn run_help_shows_file_type_flag() {
    cli().args(&["run", "--help"]).passes().stdout_has("Usage:").stdout_has("--file-type");
}

#[test]
fn global_flags_are_documented() {
    cli()
        .args(&["watch", "--help"])
        .passes()
        .stdout_has("--config")
        .stdout_has("--format")
        .stdout_has("--log-file");
}

#[test]
fn version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("savehook 0.1");
}
