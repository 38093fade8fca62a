// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config discovery and environment overrides.

use crate::env;
use savehook_core::{ConfigError, Settings};
use std::path::{Path, PathBuf};

/// Project-local config file name, looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = "savehook.toml";

/// Settings plus the file they came from.
#[derive(Debug)]
pub struct LoadedConfig {
    pub settings: Settings,
    /// `None` when running purely from environment overrides.
    pub source: Option<PathBuf>,
}

/// Load settings.
///
/// Lookup order: `--config`, `SAVEHOOK_CONFIG`, `./savehook.toml`, then the
/// user config file. An explicitly named file must exist. With no file at all,
/// defaults are used as long as `SAVEHOOK_EXECUTABLE` names the tool.
pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<LoadedConfig, ConfigError> {
    let named = explicit.map(Path::to_path_buf).or_else(env::config_path);
    let source = match named {
        Some(path) => Some(path),
        None => candidates(cwd).into_iter().find(|p| p.is_file()),
    };

    let mut settings = match &source {
        Some(path) => Settings::load(path)?,
        None if env::executable().is_some() => Settings::default(),
        None => {
            let looked = candidates(cwd)
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ConfigError::NotFound(looked));
        }
    };
    apply_overrides(&mut settings)?;
    tracing::debug!(source = ?source, "configuration loaded");
    Ok(LoadedConfig { settings, source })
}

/// Discovery candidates, most specific first.
pub fn candidates(cwd: &Path) -> Vec<PathBuf> {
    let mut paths = vec![cwd.join(LOCAL_CONFIG_FILE)];
    paths.extend(env::user_config_file());
    paths
}

fn apply_overrides(settings: &mut Settings) -> Result<(), ConfigError> {
    if let Some(executable) = env::executable() {
        settings.tool.executable = executable;
    }
    match env::timeout_ms() {
        Some(Ok(ms)) => settings.tool.timeout_ms = ms,
        Some(Err(raw)) => {
            tracing::error!(value = %raw, "SAVEHOOK_TIMEOUT_MS is not a number of milliseconds");
            return Err(ConfigError::InvalidTimeout);
        }
        None => {}
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
