// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Save-triggered pipeline: filter, build, execute, report.

use crate::gate::{FileGate, FilePermit};
use savehook_adapters::{ProcessRunner, ResultSink, WorkspaceResolver};
use savehook_core::{
    command, FileIdentity, OverlapPolicy, Report, SaveEvent, SaveEventFilter,
    ToolInvocationConfig, WorkingDir,
};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Stages a save passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Filtering,
    Rejected,
    BuildingCommand,
    Executing,
    Reporting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Filtering => "filtering",
            Stage::Rejected => "rejected",
            Stage::BuildingCommand => "building_command",
            Stage::Executing => "executing",
            Stage::Reporting => "reporting",
        };
        f.write_str(name)
    }
}

/// Behavior knobs that are not part of the tool invocation itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    pub overlap: OverlapPolicy,
    /// Treat files outside any workspace as irrelevant.
    pub require_workspace: bool,
}

/// Collaborators the pipeline delegates to.
pub struct PipelineDeps<R, S, F, W> {
    pub runner: R,
    pub sink: S,
    pub filter: F,
    pub resolver: W,
}

/// Runs the configured tool against saved files and reports the result.
///
/// At most one run per file at a time (see [`OverlapPolicy`]); different files
/// run concurrently.
pub struct SaveTriggeredPipeline<R, S, F, W> {
    config: ToolInvocationConfig,
    options: PipelineOptions,
    runner: R,
    sink: S,
    filter: F,
    resolver: W,
    gate: FileGate,
}

impl<R, S, F, W> SaveTriggeredPipeline<R, S, F, W>
where
    R: ProcessRunner,
    S: ResultSink,
    F: SaveEventFilter,
    W: WorkspaceResolver,
{
    pub fn new(
        config: ToolInvocationConfig,
        deps: PipelineDeps<R, S, F, W>,
        options: PipelineOptions,
    ) -> Self {
        tracing::info!(
            tool = config.executable_path(),
            args = ?config.args(),
            timeout_ms = config.timeout_millis(),
            overlap = ?options.overlap,
            "save pipeline initialized"
        );
        Self {
            config,
            options,
            runner: deps.runner,
            sink: deps.sink,
            filter: deps.filter,
            resolver: deps.resolver,
            gate: FileGate::new(),
        }
    }

    pub fn config(&self) -> &ToolInvocationConfig {
        &self.config
    }

    /// Number of files with a queued or running save.
    pub fn in_flight(&self) -> usize {
        self.gate.len()
    }

    /// Process one save on the caller's task.
    ///
    /// Returns the report delivered to the sink, or `None` when the save was
    /// filtered out (no process, no report).
    pub async fn handle(&self, event: SaveEvent) -> Option<Report> {
        let span = tracing::info_span!("save", path = %event.file_path().display());
        self.handle_inner(event).instrument(span).await
    }

    /// Process one save on a background task so the host can resume at once.
    pub fn dispatch(self: &Arc<Self>, event: SaveEvent) -> JoinHandle<Option<Report>> {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move { pipeline.handle(event).await })
    }

    async fn handle_inner(&self, event: SaveEvent) -> Option<Report> {
        tracing::debug!(stage = %Stage::Filtering, file_type = event.file_type_id());
        if !self.filter.accepts(&event) {
            tracing::debug!(stage = %Stage::Rejected, "not relevant");
            return None;
        }

        let path = event.file_path();
        let workspace = self.resolver.resolve(path).await;
        if workspace.is_none() && self.options.require_workspace {
            tracing::debug!(stage = %Stage::Rejected, "file belongs to no workspace");
            return None;
        }
        let file = FileIdentity::new(path).with_workspace(workspace.clone());

        let report = self.run(path, file, workspace).await;

        tracing::debug!(stage = %Stage::Reporting, outcome = %report.outcome);
        if let Err(e) = self.sink.deliver(&report).await {
            tracing::warn!(error = %e, "failed to deliver report");
        }
        tracing::debug!(stage = %Stage::Idle);
        Some(report)
    }

    async fn run(&self, path: &Path, file: FileIdentity, workspace: Option<PathBuf>) -> Report {
        tracing::debug!(stage = %Stage::BuildingCommand);
        let spec = match command::build(&self.config, path) {
            Ok(spec) => spec,
            Err(e) => {
                tracing::error!(error = %e, "cannot build tool command");
                return Report::configuration_error(file, &e);
            }
        };
        let spec = match self.config.working_dir_policy() {
            WorkingDir::Workspace => spec.with_current_dir(workspace),
            WorkingDir::Inherit | WorkingDir::Fixed(_) => spec,
        };

        let Some(_permit) = self.claim(path).await else {
            tracing::info!("save arrived while previous run is active, skipping");
            return Report::busy(file);
        };

        tracing::debug!(stage = %Stage::Executing, cmd = %spec.display());
        let result = self.runner.run(&spec, self.config.timeout_duration()).await;
        Report::from_execution(file, &self.tool_name(), result)
    }

    async fn claim(&self, path: &Path) -> Option<FilePermit<'_>> {
        match self.options.overlap {
            OverlapPolicy::Queue => Some(self.gate.acquire(path).await),
            OverlapPolicy::Reject => self.gate.try_acquire(path),
        }
    }

    fn tool_name(&self) -> String {
        let executable = self.config.executable_path();
        Path::new(executable)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| executable.to_string())
    }
}

impl<R, S, F, W> Drop for SaveTriggeredPipeline<R, S, F, W> {
    fn drop(&mut self) {
        tracing::info!(tool = self.config.executable_path(), "save pipeline disposed");
    }
}

#[cfg(test)]
#[path = "pipeline_tests/mod.rs"]
mod tests;
