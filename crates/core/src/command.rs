// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic command construction.

use crate::config::{ToolInvocationConfig, WorkingDir};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from building a command.
///
/// Local to command construction; the pipeline turns these into a
/// configuration-error report instead of propagating them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// A fully resolved process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to execute (argv\[0\]).
    pub executable: OsString,
    /// Arguments: the configured fixed args followed by the target path.
    pub args: Vec<OsString>,
    /// Working directory, or `None` to inherit.
    pub current_dir: Option<PathBuf>,
    /// Extra environment variables.
    pub env: BTreeMap<String, String>,
}

impl CommandSpec {
    /// Override the working directory.
    pub fn with_current_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.current_dir = dir;
        self
    }

    /// The target file the command runs against.
    pub fn target(&self) -> Option<&Path> {
        self.args.last().map(Path::new)
    }

    /// Render as a single shell-like line for logs and messages.
    pub fn display(&self) -> String {
        let mut line = self.executable.to_string_lossy().into_owned();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

/// Build the invocation for `target`.
///
/// Argument order is always `fixed_args` in configured order followed by the
/// target path. Flags that must precede the path belong in `fixed_args`.
pub fn build(config: &ToolInvocationConfig, target: &Path) -> Result<CommandSpec, BuildError> {
    if target.as_os_str().is_empty() {
        return Err(BuildError::InvalidArgument("target file path is empty".to_string()));
    }

    let mut args: Vec<OsString> = Vec::with_capacity(config.args().len() + 1);
    args.extend(config.args().iter().map(OsString::from));
    args.push(target.as_os_str().to_os_string());

    let current_dir = match config.working_dir_policy() {
        WorkingDir::Fixed(dir) => Some(dir.clone()),
        // Workspace roots are only known to the pipeline.
        WorkingDir::Inherit | WorkingDir::Workspace => None,
    };

    Ok(CommandSpec {
        executable: OsString::from(config.executable_path()),
        args,
        current_dir,
        env: config.env_vars().clone(),
    })
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
