// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod check;
pub mod run;
pub mod watch;

use crate::output::{OutputFormat, TerminalSink};
use savehook_adapters::{DesktopNotifySink, FanoutSink, MarkerResolver, TokioProcessRunner, TracingSink};
use savehook_core::{AnyFilter, ConfigError, Settings};
use savehook_engine::{PipelineDeps, PipelineOptions, SaveTriggeredPipeline};

/// Terminal output, then logs, then the optional desktop notification.
pub type HostSink = FanoutSink<TerminalSink, FanoutSink<TracingSink, Option<DesktopNotifySink>>>;

pub type HostPipeline = SaveTriggeredPipeline<TokioProcessRunner, HostSink, AnyFilter, MarkerResolver>;

/// Validate settings and wire up the pipeline the commands share.
pub fn build_pipeline(settings: &Settings, format: OutputFormat) -> Result<HostPipeline, ConfigError> {
    let config = settings.tool_config()?;
    let filter = settings.save_filter()?;
    if filter.is_empty() {
        tracing::warn!("no [filter] criteria configured; every save will be skipped");
    }

    let desktop = settings
        .report
        .desktop
        .then(|| DesktopNotifySink::new().notify_on_success(settings.report.notify_on_success));
    let sink = FanoutSink::new(TerminalSink::new(format), FanoutSink::new(TracingSink, desktop));

    let deps = PipelineDeps {
        runner: TokioProcessRunner::new().max_output_bytes(config.output_limit()),
        sink,
        filter,
        resolver: MarkerResolver::new(settings.workspace.markers.iter().cloned()),
    };
    let options = PipelineOptions {
        overlap: settings.pipeline.overlap,
        require_workspace: settings.pipeline.require_workspace,
    };
    Ok(SaveTriggeredPipeline::new(config, deps, options))
}
