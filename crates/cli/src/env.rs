// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI.

use std::path::PathBuf;

/// Default log filter when `SAVEHOOK_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Config file path override.
pub fn config_path() -> Option<PathBuf> {
    non_empty("SAVEHOOK_CONFIG").map(PathBuf::from)
}

/// Tool executable override, applied on top of the config file.
pub fn executable() -> Option<String> {
    non_empty("SAVEHOOK_EXECUTABLE")
}

/// Tool timeout override in milliseconds.
///
/// Unparseable values are reported to the caller rather than ignored.
pub fn timeout_ms() -> Option<Result<u64, String>> {
    non_empty("SAVEHOOK_TIMEOUT_MS").map(|raw| raw.trim().parse::<u64>().map_err(|_| raw))
}

/// `tracing-subscriber` filter directive.
pub fn log_filter() -> String {
    non_empty("SAVEHOOK_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

/// User-level config file: `<config dir>/savehook/config.toml`.
pub fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("savehook").join("config.toml"))
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
