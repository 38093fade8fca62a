// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk TOML configuration.
//!
//! `Settings` mirrors the file layout; the `*_config` accessors turn it into
//! validated runtime values, failing fast on anything that would otherwise
//! break every save.

use crate::config::{ConfigError, ToolInvocationConfig, WorkingDir, DEFAULT_MAX_OUTPUT_BYTES};
use crate::filter::{AnyFilter, ExtensionFilter, FileTypeFilter, GlobFilter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// What to do when a file is saved again while its previous run is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Wait for the running invocation, then run (FIFO per file).
    #[default]
    Queue,
    /// Skip the save and report `Busy`.
    Reject,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub tool: ToolSection,
    pub filter: FilterSection,
    pub pipeline: PipelineSection,
    pub workspace: WorkspaceSection,
    pub report: ReportSection,
    pub host: HostSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolSection {
    pub executable: String,
    pub args: Vec<String>,
    pub timeout_ms: u64,
    /// `"inherit"`, `"workspace"`, or a directory path.
    pub working_dir: String,
    pub env: BTreeMap<String, String>,
    pub max_output_bytes: usize,
}

impl Default for ToolSection {
    fn default() -> Self {
        Self {
            executable: String::new(),
            args: Vec::new(),
            timeout_ms: 5000,
            working_dir: "inherit".to_string(),
            env: BTreeMap::new(),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterSection {
    pub file_type: String,
    pub extensions: Vec<String>,
    pub globs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineSection {
    pub overlap: OverlapPolicy,
    /// Skip files that belong to no workspace.
    pub require_workspace: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceSection {
    pub markers: Vec<String>,
}

impl Default for WorkspaceSection {
    fn default() -> Self {
        Self { markers: vec!["go.mod".to_string(), ".git".to_string()] }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSection {
    pub desktop: bool,
    pub notify_on_success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostSection {
    /// Extension (without dot) to file type id.
    pub file_types: BTreeMap<String, String>,
    pub debounce_ms: u64,
    /// The tool rewrites the file it checks (`fmt -w`). `watch` then skips
    /// the write the run itself made instead of treating it as a new save.
    pub tool_rewrites: bool,
}

impl Default for HostSection {
    fn default() -> Self {
        let mut file_types = BTreeMap::new();
        file_types.insert("go".to_string(), "Go".to_string());
        Self { file_types, debounce_ms: 200, tool_rewrites: false }
    }
}

impl Settings {
    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::parse(&content, path)
    }

    /// Parse config text; `path` is only used for error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Validated tool invocation config.
    pub fn tool_config(&self) -> Result<ToolInvocationConfig, ConfigError> {
        let tool = &self.tool;
        Ok(ToolInvocationConfig::new(tool.executable.clone())?
            .fixed_args(tool.args.iter().cloned())
            .timeout_ms(tool.timeout_ms)?
            .working_dir(parse_working_dir(&tool.working_dir))
            .env(tool.env.clone())
            .max_output_bytes(tool.max_output_bytes))
    }

    /// Combined filter: file type, extensions, and globs, any of which may match.
    pub fn save_filter(&self) -> Result<AnyFilter, ConfigError> {
        let section = &self.filter;
        let mut filter = AnyFilter::new();
        if !section.file_type.is_empty() {
            filter = filter.with(FileTypeFilter::new(section.file_type.clone()));
        }
        if !section.extensions.is_empty() {
            filter = filter.with(ExtensionFilter::new(section.extensions.iter().cloned()));
        }
        for pattern in &section.globs {
            filter = filter.with(GlobFilter::new(pattern)?);
        }
        Ok(filter)
    }

    /// File type id for `path` according to the host extension map.
    pub fn file_type_for(&self, path: &Path) -> Option<&str> {
        let ext = path.extension()?.to_str()?;
        self.host.file_types.get(ext).map(String::as_str)
    }
}

fn parse_working_dir(value: &str) -> WorkingDir {
    match value.trim() {
        "" | "inherit" => WorkingDir::Inherit,
        "workspace" => WorkingDir::Workspace,
        dir => WorkingDir::Fixed(PathBuf::from(dir)),
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
