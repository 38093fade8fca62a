// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Save event relevance predicates.
//!
//! Filters are pure: no I/O, no side effects. Every built-in filter fails
//! closed, so an unconfigured filter accepts nothing.

use crate::config::ConfigError;
use crate::save::SaveEvent;
use std::collections::BTreeSet;

/// Decides whether the pipeline should act on a save.
pub trait SaveEventFilter: Send + Sync + 'static {
    fn accepts(&self, event: &SaveEvent) -> bool;
}

impl<F> SaveEventFilter for F
where
    F: Fn(&SaveEvent) -> bool + Send + Sync + 'static,
{
    fn accepts(&self, event: &SaveEvent) -> bool {
        self(event)
    }
}

/// Accepts events whose type id equals the target exactly (case-sensitive).
#[derive(Debug, Clone)]
pub struct FileTypeFilter {
    target: String,
}

impl FileTypeFilter {
    pub fn new(target: impl Into<String>) -> Self {
        Self { target: target.into() }
    }
}

impl SaveEventFilter for FileTypeFilter {
    fn accepts(&self, event: &SaveEvent) -> bool {
        !self.target.is_empty() && event.file_type_id() == self.target
    }
}

/// Accepts events whose path has one of the given extensions (without dot).
#[derive(Debug, Clone, Default)]
pub struct ExtensionFilter {
    extensions: BTreeSet<String>,
}

impl ExtensionFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let extensions = extensions
            .into_iter()
            .map(Into::into)
            .map(|e: String| e.trim_start_matches('.').to_string())
            .filter(|e| !e.is_empty())
            .collect();
        Self { extensions }
    }
}

impl SaveEventFilter for ExtensionFilter {
    fn accepts(&self, event: &SaveEvent) -> bool {
        event
            .file_path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.contains(ext))
    }
}

/// Accepts events whose full path matches a glob pattern.
#[derive(Debug, Clone)]
pub struct GlobFilter {
    pattern: glob::Pattern,
}

impl GlobFilter {
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let pattern = glob::Pattern::new(pattern).map_err(|e| ConfigError::InvalidGlob {
            pattern: pattern.to_string(),
            message: e.msg.to_string(),
        })?;
        Ok(Self { pattern })
    }
}

impl SaveEventFilter for GlobFilter {
    fn accepts(&self, event: &SaveEvent) -> bool {
        self.pattern.matches_path(event.file_path())
    }
}

/// Accepts when any of its filters accepts. Empty means accept nothing.
#[derive(Default)]
pub struct AnyFilter {
    filters: Vec<Box<dyn SaveEventFilter>>,
}

impl AnyFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: impl SaveEventFilter) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl SaveEventFilter for AnyFilter {
    fn accepts(&self, event: &SaveEvent) -> bool {
        self.filters.iter().any(|f| f.accepts(event))
    }
}

impl std::fmt::Debug for AnyFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyFilter").field("filters", &self.filters.len()).finish()
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
