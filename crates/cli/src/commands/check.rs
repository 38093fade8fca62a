// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `savehook check`: validate configuration and show what will run.

use anyhow::Result;
use savehook_core::{ConfigError, Settings};
use serde::Serialize;
use std::path::Path;

use crate::config::LoadedConfig;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

#[derive(Serialize)]
struct CheckSummary<'a> {
    source: Option<&'a Path>,
    command: String,
    timeout_ms: u64,
    settings: &'a Settings,
}

pub fn handle(loaded: &LoadedConfig, format: OutputFormat) -> Result<()> {
    let summary = summarize(loaded).map_err(ExitError::from)?;
    let toml = toml::to_string_pretty(summary.settings)?;
    format_or_json(format, &summary, || {
        let source = summary
            .source
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "environment".to_string());
        println!("{} {}", crate::color::header("config:"), source);
        println!("{} {} <file>", crate::color::header("command:"), summary.command);
        println!("{} {}ms", crate::color::header("timeout:"), summary.timeout_ms);
        println!();
        print!("{}", crate::color::context(&toml));
    })
}

fn summarize(loaded: &LoadedConfig) -> Result<CheckSummary<'_>, ConfigError> {
    let tool = loaded.settings.tool_config()?;
    let filter = loaded.settings.save_filter()?;
    if filter.is_empty() {
        tracing::warn!("no [filter] criteria configured; every save will be skipped");
    }
    let mut command = tool.executable_path().to_string();
    for arg in tool.args() {
        command.push(' ');
        command.push_str(arg);
    }
    Ok(CheckSummary {
        source: loaded.source.as_deref(),
        command,
        timeout_ms: tool.timeout_millis(),
        settings: &loaded.settings,
    })
}

#[cfg(test)]
#[path = "check_tests.rs"]
mod tests;
