// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Save notifications delivered by the host.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// A "document about to be saved" notification.
///
/// Created by the host at the moment of a save and consumed once by the
/// pipeline. The type id is whatever the host uses to classify files
/// (an editor language name, an extension mapping, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveEvent {
    file_path: PathBuf,
    file_type_id: String,
}

impl SaveEvent {
    pub fn new(file_path: impl Into<PathBuf>, file_type_id: impl Into<String>) -> Self {
        Self { file_path: file_path.into(), file_type_id: file_type_id.into() }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn file_type_id(&self) -> &str {
        &self.file_type_id
    }
}

/// The file a report is about, plus the workspace the host resolved for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileIdentity {
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<PathBuf>,
}

impl FileIdentity {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), workspace: None }
    }

    pub fn with_workspace(mut self, workspace: Option<PathBuf>) -> Self {
        self.workspace = workspace;
        self
    }

    /// File name for short user-facing messages, falling back to the full path.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Lexically normalize `path`: drop `.` components and fold `..` into the
/// preceding directory. Does not touch the filesystem or resolve symlinks.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
#[path = "save_tests.rs"]
mod tests;
