// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for the outside world: process execution, report delivery, and
//! workspace lookup.

pub mod notify;
pub mod sink;
pub mod subprocess;
pub mod workspace;

pub use notify::DesktopNotifySink;
pub use sink::{FanoutSink, ResultSink, SinkError, TracingSink};
pub use subprocess::{ProcessRunner, TokioProcessRunner};
pub use workspace::{MarkerResolver, NoWorkspace, WorkspaceResolver};

#[cfg(any(test, feature = "test-support"))]
pub use sink::FakeResultSink;
#[cfg(any(test, feature = "test-support"))]
pub use subprocess::{FakeProcessRunner, RunCall};
