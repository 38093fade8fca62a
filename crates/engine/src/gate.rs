// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-file serialization of tool runs.
//!
//! Each file path gets a FIFO async mutex while any save for it is queued or
//! running. Slots are dropped as soon as the last holder releases. Paths are
//! keyed after lexical normalization, so `./main.go` and `main.go` share one.

use parking_lot::Mutex;
use savehook_core::normalize_path;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slot = Arc<AsyncMutex<()>>;

#[derive(Debug, Default)]
pub(crate) struct FileGate {
    slots: Mutex<HashMap<PathBuf, Slot>>,
}

impl FileGate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Wait until no other run holds `path`.
    pub(crate) async fn acquire(&self, path: &Path) -> FilePermit<'_> {
        let path = normalize_path(path);
        let slot = self.slot(&path);
        let guard = slot.lock_owned().await;
        FilePermit { gate: self, path, guard: Some(guard) }
    }

    /// Claim `path` only if nothing holds or waits for it.
    pub(crate) fn try_acquire(&self, path: &Path) -> Option<FilePermit<'_>> {
        let path = normalize_path(path);
        match self.slot(&path).try_lock_owned() {
            Ok(guard) => Some(FilePermit { gate: self, path, guard: Some(guard) }),
            Err(_) => {
                self.release(&path);
                None
            }
        }
    }

    /// Number of files with a queued or running save.
    pub(crate) fn len(&self) -> usize {
        self.slots.lock().len()
    }

    fn slot(&self, path: &Path) -> Slot {
        Arc::clone(self.slots.lock().entry(path.to_path_buf()).or_default())
    }

    /// Remove the slot for `path` if the map holds the only reference.
    fn release(&self, path: &Path) {
        let mut slots = self.slots.lock();
        if slots.get(path).is_some_and(|slot| Arc::strong_count(slot) == 1) {
            slots.remove(path);
        }
    }
}

/// Exclusive claim on one file; released on drop.
#[derive(Debug)]
pub(crate) struct FilePermit<'a> {
    gate: &'a FileGate,
    path: PathBuf,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for FilePermit<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.gate.release(&self.path);
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
