// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for per-file serialization of overlapping saves.

use super::*;
use savehook_core::{OverlapPolicy, ReportOutcome};
use std::time::Duration;

#[tokio::test]
async fn queued_saves_for_one_file_never_overlap() {
    let h = harness(PipelineOptions::default());
    h.runner.set_delay(Duration::from_millis(100));

    let first = h.pipeline.dispatch(go_save("/proj/main.go"));
    let second = h.pipeline.dispatch(go_save("/proj/main.go"));
    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();

    assert_eq!(first.outcome, ReportOutcome::Success);
    assert_eq!(second.outcome, ReportOutcome::Success);
    assert_eq!(h.runner.calls().len(), 2);
    assert_eq!(h.runner.peak_concurrency_for("/proj/main.go"), 1);
    assert_eq!(h.sink.reports().len(), 2);
    assert_eq!(h.pipeline.in_flight(), 0);
}

#[tokio::test]
async fn rejecting_policy_reports_busy_for_overlapping_save() {
    let options = PipelineOptions { overlap: OverlapPolicy::Reject, ..Default::default() };
    let h = harness(options);
    h.runner.set_delay(Duration::from_millis(200));

    let first = h.pipeline.dispatch(go_save("/proj/main.go"));
    while h.runner.calls().is_empty() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let second = h.pipeline.handle(go_save("/proj/main.go")).await.unwrap();
    let first = first.await.unwrap().unwrap();

    assert_eq!(second.outcome, ReportOutcome::Busy);
    assert!(second.is_error());
    assert_eq!(first.outcome, ReportOutcome::Success);
    assert_eq!(h.runner.calls().len(), 1);
    assert_eq!(h.sink.reports().len(), 2);
}

#[tokio::test]
async fn rejecting_policy_allows_sequential_saves() {
    let options = PipelineOptions { overlap: OverlapPolicy::Reject, ..Default::default() };
    let h = harness(options);

    for _ in 0..3 {
        let report = h.pipeline.handle(go_save("/proj/main.go")).await.unwrap();
        assert_eq!(report.outcome, ReportOutcome::Success);
    }
    assert_eq!(h.runner.calls().len(), 3);
}

#[tokio::test]
async fn different_files_run_concurrently() {
    let h = harness(PipelineOptions::default());
    h.runner.set_delay(Duration::from_millis(200));

    let a = h.pipeline.dispatch(go_save("/proj/a.go"));
    let b = h.pipeline.dispatch(go_save("/proj/b.go"));
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    assert_eq!(h.runner.peak_concurrency(), 2);
    assert_eq!(h.runner.peak_concurrency_for("/proj/a.go"), 1);
    assert_eq!(h.runner.peak_concurrency_for("/proj/b.go"), 1);
}
