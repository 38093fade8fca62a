// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for driving the `savehook` binary.

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::TempDir;

/// Path to the built `savehook` binary, building it once if needed.
fn savehook_bin() -> &'static Path {
    static BIN: OnceLock<PathBuf> = OnceLock::new();
    BIN.get_or_init(|| {
        // target/<profile>/deps/specs-<hash> -> target/<profile>/savehook
        let exe = std::env::current_exe().expect("test executable path");
        let profile_dir = exe.parent().and_then(Path::parent).expect("target profile dir");
        let bin = profile_dir.join(format!("savehook{}", std::env::consts::EXE_SUFFIX));
        if !bin.exists() {
            let cargo = std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
            let status = std::process::Command::new(cargo)
                .args(["build", "-p", "savehook", "--bin", "savehook"])
                .status()
                .expect("run cargo build");
            assert!(status.success(), "failed to build savehook");
        }
        bin
    })
}

/// `savehook` with a neutral environment: no color, quiet logs, no overrides.
pub fn cli() -> SpecCommand {
    let mut cmd = Command::new(savehook_bin());
    cmd.env("NO_COLOR", "1")
        .env("SAVEHOOK_LOG", "warn")
        .env_remove("SAVEHOOK_CONFIG")
        .env_remove("SAVEHOOK_EXECUTABLE")
        .env_remove("SAVEHOOK_TIMEOUT_MS");
    SpecCommand { cmd }
}

/// Temporary project directory with an isolated user config location.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self { dir: TempDir::new().expect("create temp dir") }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `rel`, creating parent directories.
    pub fn file(&self, rel: &str, content: &str) {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(path, content).expect("write file");
    }

    /// Write `savehook.toml` at the project root.
    pub fn config(&self, content: &str) {
        self.file("savehook.toml", content);
    }

    /// `savehook` running in this project.
    pub fn savehook(&self) -> SpecCommand {
        let mut spec = cli();
        let home = self.dir.path().join(".home");
        spec.cmd
            .current_dir(self.dir.path())
            .env("HOME", &home)
            .env("XDG_CONFIG_HOME", home.join(".config"));
        spec
    }
}

pub struct SpecCommand {
    cmd: Command,
}

impl SpecCommand {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn passes(self) -> SpecOutput {
        self.exits(0)
    }

    pub fn exits(mut self, code: i32) -> SpecOutput {
        let output = SpecOutput::from(self.cmd.output().expect("run savehook"));
        assert_eq!(output.code, Some(code), "unexpected exit code\n{output}");
        output
    }
}

pub struct SpecOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl From<std::process::Output> for SpecOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl std::fmt::Display for SpecOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "code: {:?}\nstdout:\n{}\nstderr:\n{}", self.code, self.stdout, self.stderr)
    }
}

impl SpecOutput {
    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout.contains(needle), "stdout lacks {needle:?}\n{self}");
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(!self.stdout.contains(needle), "stdout has {needle:?}\n{self}");
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr.contains(needle), "stderr lacks {needle:?}\n{self}");
        self
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout, expected);
        self
    }

    /// Parse each stdout line as JSON.
    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.stdout
            .lines()
            .map(|line| serde_json::from_str(line).expect("stdout line is JSON"))
            .collect()
    }
}
