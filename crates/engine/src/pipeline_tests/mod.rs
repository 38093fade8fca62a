// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the save-triggered pipeline.

use super::*;
use savehook_adapters::{FakeProcessRunner, FakeResultSink, NoWorkspace};
use savehook_core::FileTypeFilter;

mod execution;
mod filtering;
mod overlap;

type TestPipeline = SaveTriggeredPipeline<FakeProcessRunner, FakeResultSink, FileTypeFilter, NoWorkspace>;

/// Pipeline wired to fakes, plus handles to inspect them.
pub(crate) struct Harness {
    pub pipeline: Arc<TestPipeline>,
    pub runner: FakeProcessRunner,
    pub sink: FakeResultSink,
}

pub(crate) fn go_config() -> ToolInvocationConfig {
    ToolInvocationConfig::new("/usr/local/bin/fmt")
        .unwrap()
        .fixed_args(["-l", "-w"])
        .timeout_ms(5000)
        .unwrap()
}

pub(crate) fn harness(options: PipelineOptions) -> Harness {
    harness_with(go_config(), options)
}

pub(crate) fn harness_with(config: ToolInvocationConfig, options: PipelineOptions) -> Harness {
    let runner = FakeProcessRunner::new();
    let sink = FakeResultSink::new();
    let deps = PipelineDeps {
        runner: runner.clone(),
        sink: sink.clone(),
        filter: FileTypeFilter::new("Go"),
        resolver: NoWorkspace,
    };
    let pipeline = Arc::new(SaveTriggeredPipeline::new(config, deps, options));
    Harness { pipeline, runner, sink }
}

pub(crate) fn go_save(path: &str) -> SaveEvent {
    SaveEvent::new(path, "Go")
}
