// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Completion reports handed to result sinks.

use crate::command::BuildError;
use crate::outcome::{ExecutionResult, Outcome};
use crate::save::FileIdentity;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Reported outcome of one accepted save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportOutcome {
    Success,
    NonZeroExit,
    TimedOut,
    LaunchFailed,
    ConfigurationError,
    Busy,
}

impl ReportOutcome {
    pub fn is_error(self) -> bool {
        self != ReportOutcome::Success
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportOutcome::Success => "success",
            ReportOutcome::NonZeroExit => "non_zero_exit",
            ReportOutcome::TimedOut => "timed_out",
            ReportOutcome::LaunchFailed => "launch_failed",
            ReportOutcome::ConfigurationError => "configuration_error",
            ReportOutcome::Busy => "busy",
        }
    }
}

impl From<Outcome> for ReportOutcome {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ReportOutcome::Success,
            Outcome::NonZeroExit => ReportOutcome::NonZeroExit,
            Outcome::TimedOut => ReportOutcome::TimedOut,
            Outcome::LaunchFailed => ReportOutcome::LaunchFailed,
        }
    }
}

impl fmt::Display for ReportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-facing summary of what happened to one save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub file: FileIdentity,
    pub outcome: ReportOutcome,
    pub message: String,
    /// Exit code of the tool, when it ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl Report {
    /// Map a finished run to a report. `tool` names the executable in messages.
    pub fn from_execution(file: FileIdentity, tool: &str, result: ExecutionResult) -> Self {
        let name = file.display_name();
        let ms = duration_ms(result.duration);
        let (message, exit_code) = match result.outcome {
            Outcome::Success => (format!("{tool} succeeded on {name} ({ms}ms)"), Some(0)),
            Outcome::NonZeroExit => (
                format!("{tool} failed on {name}: exit code {}", result.exit_code),
                Some(result.exit_code),
            ),
            Outcome::TimedOut => (format!("{tool} timed out on {name} after {ms}ms"), None),
            Outcome::LaunchFailed => {
                let detail = result.combined_output.trim();
                (format!("failed to launch {tool} for {name}: {detail}"), None)
            }
        };
        Self {
            file,
            outcome: result.outcome.into(),
            message,
            exit_code,
            output: result.combined_output,
            duration_ms: Some(ms),
        }
    }

    pub fn configuration_error(file: FileIdentity, error: &BuildError) -> Self {
        let message = format!("configuration error for {}: {error}", file.display_name());
        Self::without_run(file, ReportOutcome::ConfigurationError, message)
    }

    pub fn busy(file: FileIdentity) -> Self {
        let message = format!("{} is already being processed; save skipped", file.display_name());
        Self::without_run(file, ReportOutcome::Busy, message)
    }

    fn without_run(file: FileIdentity, outcome: ReportOutcome, message: String) -> Self {
        Self { file, outcome, message, exit_code: None, output: String::new(), duration_ms: None }
    }

    pub fn is_error(&self) -> bool {
        self.outcome.is_error()
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
