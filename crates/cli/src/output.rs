// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;
use std::path::Path;

use async_trait::async_trait;
use clap::ValueEnum;
use savehook_adapters::{ResultSink, SinkError};
use savehook_core::Report;
use serde::Serialize;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render a report as one or more terminal lines.
///
/// Tool output, when there is any, follows the summary line indented.
pub fn report_text(report: &Report) -> String {
    let status = crate::color::outcome(report.outcome, &format!("{:<19}", report.outcome.as_str()));
    let mut text = format!("{} {}", status, report.message);
    for line in report.output.lines() {
        text.push_str("\n  ");
        text.push_str(line);
    }
    text
}

/// Render a report as a single JSON line.
pub fn report_json(report: &Report) -> serde_json::Result<String> {
    serde_json::to_string(report)
}

#[derive(Serialize)]
struct Skipped<'a> {
    file: &'a Path,
    outcome: &'static str,
}

/// Render the line printed when a save is filtered out.
pub fn skipped(path: &Path, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(format!(
            "{} {} is not handled by the configured filter",
            crate::color::skipped(&format!("{:<19}", "skipped")),
            path.display()
        )),
        OutputFormat::Json => serde_json::to_string(&Skipped { file: path, outcome: "skipped" }),
    }
}

/// Format-branch helper for single values.
///
/// Renders as JSON when `format` is `Json`, otherwise calls `text_fn`.
pub fn format_or_json<T: Serialize>(
    format: OutputFormat,
    data: &T,
    text_fn: impl FnOnce(),
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Text => {
            text_fn();
        }
    }
    Ok(())
}

/// Prints each report to stdout as it is delivered.
#[derive(Clone, Copy, Debug)]
pub struct TerminalSink {
    format: OutputFormat,
}

impl TerminalSink {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    fn render(&self, report: &Report) -> Result<String, SinkError> {
        match self.format {
            OutputFormat::Text => Ok(report_text(report)),
            OutputFormat::Json => {
                report_json(report).map_err(|e| SinkError::DeliveryFailed(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl ResultSink for TerminalSink {
    async fn deliver(&self, report: &Report) -> Result<(), SinkError> {
        let line = self.render(report)?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{line}")
            .and_then(|()| stdout.flush())
            .map_err(|e| SinkError::DeliveryFailed(e.to_string()))
    }
}
