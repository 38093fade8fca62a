// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validated tool invocation configuration.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default time budget for a single tool run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default cap on captured combined output.
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 64 * 1024;

/// Errors raised while constructing or loading configuration.
///
/// These are startup defects, surfaced before any save is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("tool executable path is empty or missing")]
    MissingExecutable,
    #[error("timeout must be greater than zero")]
    InvalidTimeout,
    #[error("failed to read config {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("invalid glob pattern `{pattern}`: {message}")]
    InvalidGlob { pattern: String, message: String },
    #[error("no configuration found (looked in {0})")]
    NotFound(String),
}

/// Where the external tool runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WorkingDir {
    /// Inherit the host process's working directory.
    #[default]
    Inherit,
    /// Run in the workspace root resolved for the saved file, if any.
    Workspace,
    /// Run in a fixed directory.
    Fixed(PathBuf),
}

/// How to invoke the external tool.
///
/// Immutable after construction; the executable path is validated here so a
/// misconfigured pipeline fails at startup rather than on every save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocationConfig {
    executable_path: String,
    fixed_args: Vec<String>,
    timeout: Duration,
    working_dir: WorkingDir,
    env: BTreeMap<String, String>,
    max_output_bytes: usize,
}

impl ToolInvocationConfig {
    /// Create a config with default args (none), timeout and working dir.
    pub fn new(executable_path: impl Into<String>) -> Result<Self, ConfigError> {
        let executable_path = executable_path.into();
        if executable_path.trim().is_empty() {
            return Err(ConfigError::MissingExecutable);
        }
        Ok(Self {
            executable_path,
            fixed_args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            working_dir: WorkingDir::Inherit,
            env: BTreeMap::new(),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        })
    }

    pub fn fixed_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fixed_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        self.timeout = timeout;
        Ok(self)
    }

    pub fn timeout_ms(self, millis: u64) -> Result<Self, ConfigError> {
        self.timeout(Duration::from_millis(millis))
    }

    pub fn working_dir(mut self, working_dir: WorkingDir) -> Self {
        self.working_dir = working_dir;
        self
    }

    pub fn env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn max_output_bytes(mut self, limit: usize) -> Self {
        self.max_output_bytes = limit;
        self
    }

    pub fn executable_path(&self) -> &str {
        &self.executable_path
    }

    pub fn args(&self) -> &[String] {
        &self.fixed_args
    }

    pub fn timeout_duration(&self) -> Duration {
        self.timeout
    }

    /// Timeout in whole milliseconds, saturating at `u64::MAX`.
    pub fn timeout_millis(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    pub fn working_dir_policy(&self) -> &WorkingDir {
        &self.working_dir
    }

    pub fn env_vars(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn output_limit(&self) -> usize {
        self.max_output_bytes
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
