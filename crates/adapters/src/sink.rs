// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Result sinks: where completion reports go.

use async_trait::async_trait;
use savehook_core::{Report, ReportOutcome};
use thiserror::Error;

/// Errors from report delivery
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),
}

/// Consumes completion reports for presentation.
///
/// Delivery is fire-and-forget from the pipeline's point of view: a sink must
/// not block on user interaction, and its errors are only logged.
#[async_trait]
pub trait ResultSink: Clone + Send + Sync + 'static {
    async fn deliver(&self, report: &Report) -> Result<(), SinkError>;
}

/// Writes every report to the tracing log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

#[async_trait]
impl ResultSink for TracingSink {
    async fn deliver(&self, report: &Report) -> Result<(), SinkError> {
        let path = report.file.path.display();
        match report.outcome {
            ReportOutcome::Success => {
                tracing::info!(%path, outcome = %report.outcome, "{}", report.message)
            }
            ReportOutcome::Busy | ReportOutcome::NonZeroExit => tracing::warn!(
                %path,
                outcome = %report.outcome,
                exit_code = ?report.exit_code,
                output = %report.output,
                "{}",
                report.message
            ),
            ReportOutcome::TimedOut
            | ReportOutcome::LaunchFailed
            | ReportOutcome::ConfigurationError => tracing::error!(
                %path,
                outcome = %report.outcome,
                output = %report.output,
                "{}",
                report.message
            ),
        }
        Ok(())
    }
}

/// Delivers to two sinks in order. Both are attempted; the first error wins.
#[derive(Clone, Debug)]
pub struct FanoutSink<A, B> {
    first: A,
    second: B,
}

impl<A, B> FanoutSink<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

#[async_trait]
impl<A: ResultSink, B: ResultSink> ResultSink for FanoutSink<A, B> {
    async fn deliver(&self, report: &Report) -> Result<(), SinkError> {
        let first = self.first.deliver(report).await;
        let second = self.second.deliver(report).await;
        first.and(second)
    }
}

/// Sink that may or may not be present.
#[async_trait]
impl<S: ResultSink> ResultSink for Option<S> {
    async fn deliver(&self, report: &Report) -> Result<(), SinkError> {
        match self {
            Some(sink) => sink.deliver(report).await,
            None => Ok(()),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{ResultSink, SinkError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use savehook_core::Report;
    use std::sync::Arc;

    struct FakeSinkState {
        reports: Vec<Report>,
        fail: bool,
    }

    /// Fake sink for testing
    #[derive(Clone)]
    pub struct FakeResultSink {
        inner: Arc<Mutex<FakeSinkState>>,
    }

    impl Default for FakeResultSink {
        fn default() -> Self {
            Self { inner: Arc::new(Mutex::new(FakeSinkState { reports: Vec::new(), fail: false })) }
        }
    }

    impl FakeResultSink {
        pub fn new() -> Self {
            Self::default()
        }

        /// Record reports but return an error from every delivery.
        pub fn failing() -> Self {
            let sink = Self::default();
            sink.inner.lock().fail = true;
            sink
        }

        /// Get all delivered reports
        pub fn reports(&self) -> Vec<Report> {
            self.inner.lock().reports.clone()
        }
    }

    #[async_trait]
    impl ResultSink for FakeResultSink {
        async fn deliver(&self, report: &Report) -> Result<(), SinkError> {
            let mut state = self.inner.lock();
            state.reports.push(report.clone());
            if state.fail {
                return Err(SinkError::DeliveryFailed("fake failure".to_string()));
            }
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeResultSink;

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
