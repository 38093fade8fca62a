// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace resolution for saved files.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Resolves the logical workspace (project root) a file belongs to.
#[async_trait]
pub trait WorkspaceResolver: Send + Sync + 'static {
    async fn resolve(&self, file: &Path) -> Option<PathBuf>;
}

/// Resolver that never finds a workspace.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoWorkspace;

#[async_trait]
impl WorkspaceResolver for NoWorkspace {
    async fn resolve(&self, _file: &Path) -> Option<PathBuf> {
        None
    }
}

/// Walks up from the file's directory to the nearest directory containing
/// one of the marker entries (`go.mod`, `.git`, ...).
#[derive(Clone, Debug)]
pub struct MarkerResolver {
    markers: Vec<String>,
}

impl MarkerResolver {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { markers: markers.into_iter().map(Into::into).collect() }
    }
}

#[async_trait]
impl WorkspaceResolver for MarkerResolver {
    /// The marker lookups run on the blocking pool.
    async fn resolve(&self, file: &Path) -> Option<PathBuf> {
        let markers = self.markers.clone();
        let file = file.to_path_buf();
        match tokio::task::spawn_blocking(move || nearest_marker(&file, &markers)).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(error = %e, "workspace lookup task failed");
                None
            }
        }
    }
}

fn nearest_marker(file: &Path, markers: &[String]) -> Option<PathBuf> {
    file.parent()?
        .ancestors()
        .filter(|dir| !dir.as_os_str().is_empty())
        .find(|dir| markers.iter().any(|m| dir.join(m).exists()))
        .map(Path::to_path_buf)
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
