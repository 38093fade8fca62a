// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured result of one external tool run.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exit code recorded when no real exit code exists (launch failure,
/// timeout kill, termination by signal).
pub const NO_EXIT_CODE: i32 = -1;

/// How a tool run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    NonZeroExit,
    TimedOut,
    LaunchFailed,
}

/// Outcome of executing a `CommandSpec`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: i32,
    /// Interleaved stdout and stderr, possibly truncated.
    pub combined_output: String,
    pub duration: Duration,
    pub outcome: Outcome,
}

impl ExecutionResult {
    /// Classify a process that exited on its own.
    pub fn exited(exit_code: i32, combined_output: String, duration: Duration) -> Self {
        let outcome = if exit_code == 0 { Outcome::Success } else { Outcome::NonZeroExit };
        Self { exit_code, combined_output, duration, outcome }
    }

    pub fn timed_out(combined_output: String, duration: Duration) -> Self {
        Self { exit_code: NO_EXIT_CODE, combined_output, duration, outcome: Outcome::TimedOut }
    }

    pub fn launch_failed(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            exit_code: NO_EXIT_CODE,
            combined_output: message.into(),
            duration,
            outcome: Outcome::LaunchFailed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}
