// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for filtering and command construction failures.

use super::*;
use savehook_adapters::MarkerResolver;
use savehook_core::ReportOutcome;

#[yare::parameterized(
    python = { "Python" },
    lowercase = { "go" },
    empty = { "" },
)]
fn irrelevant_saves_are_silent(file_type: &str) {
    tokio::runtime::Runtime::new().unwrap().block_on(async {
        let h = harness(PipelineOptions::default());
        let report = h.pipeline.handle(SaveEvent::new("/proj/main.py", file_type)).await;

        assert!(report.is_none());
        assert!(h.runner.calls().is_empty());
        assert!(h.sink.reports().is_empty());
    });
}

#[tokio::test]
async fn relevant_save_runs_once_and_reports_once() {
    let h = harness(PipelineOptions::default());
    let report = h.pipeline.handle(go_save("/proj/main.go")).await.unwrap();

    assert_eq!(report.outcome, ReportOutcome::Success);
    assert_eq!(h.runner.calls().len(), 1);
    assert_eq!(h.sink.reports(), vec![report]);
}

#[tokio::test]
async fn empty_path_is_configuration_error_without_launch() {
    let h = harness(PipelineOptions::default());
    let report = h.pipeline.handle(go_save("")).await.unwrap();

    assert_eq!(report.outcome, ReportOutcome::ConfigurationError);
    assert!(report.message.contains("invalid argument"), "{}", report.message);
    assert!(h.runner.calls().is_empty());
    assert_eq!(h.sink.reports().len(), 1);
}

#[tokio::test]
async fn custom_predicate_replaces_default_filter() {
    let runner = FakeProcessRunner::new();
    let sink = FakeResultSink::new();
    let deps = PipelineDeps {
        runner: runner.clone(),
        sink: sink.clone(),
        filter: |e: &SaveEvent| e.file_path().extension().is_some_and(|x| x == "tmpl"),
        resolver: NoWorkspace,
    };
    let pipeline = SaveTriggeredPipeline::new(go_config(), deps, PipelineOptions::default());

    assert!(pipeline.handle(go_save("/proj/main.go")).await.is_none());
    assert!(pipeline.handle(SaveEvent::new("/proj/page.tmpl", "")).await.is_some());
    assert_eq!(runner.calls().len(), 1);
    assert_eq!(sink.reports().len(), 1);
}

#[tokio::test]
async fn require_workspace_skips_files_outside_any_workspace() {
    let options = PipelineOptions { require_workspace: true, ..Default::default() };
    let h = harness(options);

    assert!(h.pipeline.handle(go_save("/proj/main.go")).await.is_none());
    assert!(h.runner.calls().is_empty());
    assert!(h.sink.reports().is_empty());
}

#[tokio::test]
async fn resolved_workspace_is_reported_and_used_as_working_dir() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("go.mod"), "module demo\n").unwrap();
    std::fs::create_dir(root.path().join("cmd")).unwrap();
    let file = root.path().join("cmd/main.go");

    let runner = FakeProcessRunner::new();
    let sink = FakeResultSink::new();
    let deps = PipelineDeps {
        runner: runner.clone(),
        sink: sink.clone(),
        filter: FileTypeFilter::new("Go"),
        resolver: MarkerResolver::new(["go.mod"]),
    };
    let config = go_config().working_dir(WorkingDir::Workspace);
    let options = PipelineOptions { require_workspace: true, ..Default::default() };
    let pipeline = SaveTriggeredPipeline::new(config, deps, options);

    let report = pipeline.handle(SaveEvent::new(&file, "Go")).await.unwrap();

    assert_eq!(report.file.workspace.as_deref(), Some(root.path()));
    assert_eq!(runner.calls()[0].spec.current_dir.as_deref(), Some(root.path()));
}
