// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! savehook-core: value types and pure logic for the save-triggered tool pipeline

pub mod command;
pub mod config;
pub mod filter;
pub mod outcome;
pub mod report;
pub mod save;
pub mod settings;

pub use command::{build, BuildError, CommandSpec};
pub use config::{ConfigError, ToolInvocationConfig, WorkingDir, DEFAULT_TIMEOUT};
pub use filter::{AnyFilter, ExtensionFilter, FileTypeFilter, GlobFilter, SaveEventFilter};
pub use outcome::{ExecutionResult, Outcome, NO_EXIT_CODE};
pub use report::{Report, ReportOutcome};
pub use save::{normalize_path, FileIdentity, SaveEvent};
pub use settings::{OverlapPolicy, Settings};
