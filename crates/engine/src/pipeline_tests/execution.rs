// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for running the tool and mapping results to reports.

use super::*;
use savehook_adapters::TokioProcessRunner;
use savehook_core::{ExecutionResult, ReportOutcome};
use std::ffi::OsString;
use std::time::Duration;

#[tokio::test]
async fn invokes_tool_with_fixed_args_then_target() {
    let h = harness(PipelineOptions::default());
    let report = h.pipeline.handle(go_save("/proj/main.go")).await.unwrap();

    let calls = h.runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].spec.executable, OsString::from("/usr/local/bin/fmt"));
    assert_eq!(
        calls[0].spec.args,
        vec![OsString::from("-l"), OsString::from("-w"), OsString::from("/proj/main.go")]
    );
    assert_eq!(calls[0].timeout, Duration::from_millis(5000));
    assert_eq!(calls[0].spec.current_dir, None);

    assert_eq!(report.outcome, ReportOutcome::Success);
    assert_eq!(report.exit_code, Some(0));
    assert_eq!(report.file.path, PathBuf::from("/proj/main.go"));
    assert!(report.message.starts_with("fmt succeeded on main.go"), "{}", report.message);
}

#[tokio::test]
async fn non_zero_exit_reports_code_and_output() {
    let h = harness(PipelineOptions::default());
    h.runner.push_result(ExecutionResult::exited(
        7,
        "main.go:3: syntax error\n".to_string(),
        Duration::from_millis(12),
    ));

    let report = h.pipeline.handle(go_save("/proj/main.go")).await.unwrap();

    assert_eq!(report.outcome, ReportOutcome::NonZeroExit);
    assert_eq!(report.exit_code, Some(7));
    assert_eq!(report.output, "main.go:3: syntax error\n");
    assert_eq!(report.message, "fmt failed on main.go: exit code 7");
    assert_eq!(h.sink.reports(), vec![report]);
}

#[tokio::test]
async fn timeout_is_reported_as_timed_out() {
    let h = harness(PipelineOptions::default());
    h.runner.push_result(ExecutionResult::timed_out(String::new(), Duration::from_millis(5000)));

    let report = h.pipeline.handle(go_save("/proj/main.go")).await.unwrap();

    assert_eq!(report.outcome, ReportOutcome::TimedOut);
    assert_eq!(report.exit_code, None);
    assert!(report.message.contains("timed out"), "{}", report.message);
}

#[tokio::test]
async fn launch_failure_is_reported_with_detail() {
    let h = harness(PipelineOptions::default());
    h.runner.push_result(ExecutionResult::launch_failed("No such file or directory", Duration::ZERO));

    let report = h.pipeline.handle(go_save("/proj/main.go")).await.unwrap();

    assert_eq!(report.outcome, ReportOutcome::LaunchFailed);
    assert!(report.message.contains("No such file or directory"), "{}", report.message);
}

#[tokio::test]
async fn failing_sink_does_not_fail_the_save() {
    let runner = FakeProcessRunner::new();
    let sink = FakeResultSink::failing();
    let deps = PipelineDeps {
        runner: runner.clone(),
        sink: sink.clone(),
        filter: FileTypeFilter::new("Go"),
        resolver: NoWorkspace,
    };
    let pipeline = SaveTriggeredPipeline::new(go_config(), deps, PipelineOptions::default());

    let report = pipeline.handle(go_save("/proj/main.go")).await;

    assert!(report.is_some());
    assert_eq!(sink.reports().len(), 1);
}

#[tokio::test]
async fn fixed_working_dir_is_passed_to_runner() {
    let config = go_config().working_dir(WorkingDir::Fixed(PathBuf::from("/srv/build")));
    let h = harness_with(config, PipelineOptions::default());

    h.pipeline.handle(go_save("/proj/main.go")).await.unwrap();

    assert_eq!(h.runner.calls()[0].spec.current_dir, Some(PathBuf::from("/srv/build")));
}

#[tokio::test]
async fn workspace_policy_without_workspace_inherits_cwd() {
    let config = go_config().working_dir(WorkingDir::Workspace);
    let h = harness_with(config, PipelineOptions::default());

    h.pipeline.handle(go_save("/proj/main.go")).await.unwrap();

    assert_eq!(h.runner.calls()[0].spec.current_dir, None);
}

#[tokio::test]
async fn dispatch_returns_report_from_background_task() {
    let h = harness(PipelineOptions::default());
    let handle = h.pipeline.dispatch(go_save("/proj/main.go"));

    let report = handle.await.unwrap().unwrap();
    assert_eq!(report.outcome, ReportOutcome::Success);
    assert_eq!(h.pipeline.in_flight(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn real_process_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("main.go");
    std::fs::write(&file, "package main\n").unwrap();

    let config = ToolInvocationConfig::new("/bin/sh")
        .unwrap()
        .fixed_args(["-c", "echo checked \"$0\"; exit 3"])
        .timeout_ms(5000)
        .unwrap();
    let sink = FakeResultSink::new();
    let deps = PipelineDeps {
        runner: TokioProcessRunner::new(),
        sink: sink.clone(),
        filter: FileTypeFilter::new("Go"),
        resolver: NoWorkspace,
    };
    let pipeline = SaveTriggeredPipeline::new(config, deps, PipelineOptions::default());

    let report = pipeline.handle(SaveEvent::new(&file, "Go")).await.unwrap();

    assert_eq!(report.outcome, ReportOutcome::NonZeroExit);
    assert_eq!(report.exit_code, Some(3));
    assert_eq!(report.output.trim(), format!("checked {}", file.display()));
    assert_eq!(sink.reports().len(), 1);
}
