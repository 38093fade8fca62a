// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `savehook watch`: turn file writes under a directory into saves.
//!
//! Raw filesystem events are debounced per path. A file's settled writes are
//! held back while its run is in flight and released when the run finishes,
//! so a save made mid-run is checked afterwards. With `[host] tool_rewrites`
//! the content a run left behind is remembered and the write the tool itself
//! made is not treated as a new save.

use anyhow::Result;
use clap::Args;
use notify::event::ModifyKind;
use notify::{Event as NotifyEvent, EventKind, RecursiveMode, Watcher};
use savehook_adapters::{ProcessRunner, ResultSink, WorkspaceResolver};
use savehook_core::settings::HostSection;
use savehook_core::{normalize_path, SaveEvent, SaveEventFilter, Settings};
use savehook_engine::SaveTriggeredPipeline;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::exit_error::ExitError;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct WatchArgs {
    /// Directory to watch recursively (default: current directory)
    pub dir: Option<PathBuf>,
}

pub async fn handle(args: WatchArgs, settings: &Settings, cwd: &Path, format: OutputFormat) -> Result<()> {
    let pipeline = Arc::new(super::build_pipeline(settings, format).map_err(ExitError::from)?);
    let root = normalize_path(&cwd.join(args.dir.unwrap_or_default()));

    let (tx, rx) = mpsc::channel::<PathBuf>(256);
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<NotifyEvent>| match res {
        Ok(event) if is_write(&event.kind) => {
            for path in event.paths {
                let _ = tx.blocking_send(path);
            }
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "file watcher error"),
    })?;
    watcher.watch(&root, RecursiveMode::Recursive)?;
    tracing::info!(
        dir = %root.display(),
        debounce_ms = settings.host.debounce_ms,
        tool_rewrites = settings.host.tool_rewrites,
        "watching for saves"
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };
    watch_loop(pipeline, settings, WatchState::new(root, &settings.host), rx, shutdown).await;
    Ok(())
}

/// Turn raw write events into pipeline dispatches until `shutdown` resolves.
pub(crate) async fn watch_loop<R, S, F, W>(
    pipeline: Arc<SaveTriggeredPipeline<R, S, F, W>>,
    settings: &Settings,
    mut state: WatchState,
    mut writes: mpsc::Receiver<PathBuf>,
    shutdown: impl Future<Output = ()>,
) where
    R: ProcessRunner,
    S: ResultSink,
    F: SaveEventFilter,
    W: WorkspaceResolver,
{
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<(PathBuf, Option<String>)>();
    tokio::pin!(shutdown);

    loop {
        let deadline = state.next_deadline();
        tokio::select! {
            Some(path) = writes.recv() => state.on_write(path, Instant::now()),
            Some((path, after)) = done_rx.recv() => state.finish(&path, after, Instant::now()),
            _ = sleep_until(deadline) => {
                for path in state.take_due(Instant::now()) {
                    let Some(hash) = content_hash(&path).await else {
                        continue;
                    };
                    if !state.start(&path, hash) {
                        tracing::debug!(path = %path.display(), "ignoring write made by the tool");
                        continue;
                    }

                    let file_type = settings.file_type_for(&path).unwrap_or_default();
                    let run = pipeline.dispatch(SaveEvent::new(path.clone(), file_type));
                    let done = done_tx.clone();
                    tokio::spawn(async move {
                        if let Err(e) = run.await {
                            tracing::error!(error = %e, "save task failed");
                        }
                        let after = content_hash(&path).await;
                        let _ = done.send((path, after));
                    });
                }
            }
            _ = &mut shutdown => {
                tracing::info!(in_flight = state.in_flight(), "stopping watch");
                break;
            }
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Events that may mean a file's content changed.
pub(crate) fn is_write(kind: &EventKind) -> bool {
    match kind {
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Create(_) | EventKind::Modify(_) => true,
        _ => false,
    }
}

/// Hidden files and directories under the watch root (`.git`, editor swap
/// files) never produce saves.
pub(crate) fn is_ignored(root: &Path, path: &Path) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

/// SHA-256 of the file's content, or `None` if it is not a readable file.
pub(crate) async fn content_hash(path: &Path) -> Option<String> {
    if !tokio::fs::metadata(path).await.ok()?.is_file() {
        return None;
    }
    let bytes = tokio::fs::read(path).await.ok()?;
    Some(format!("{:x}", Sha256::digest(&bytes)))
}

/// Per-path bookkeeping for the watch loop: debounce, runs in flight, and
/// the tool's own writes.
#[derive(Debug)]
pub(crate) struct WatchState {
    root: PathBuf,
    debouncer: Debouncer,
    echoes: SelfWrites,
    /// Content hash each in-flight run started from.
    running: HashMap<PathBuf, String>,
    /// Settled writes waiting for their file's run to finish.
    held: HashSet<PathBuf>,
    tool_rewrites: bool,
}

impl WatchState {
    pub(crate) fn new(root: PathBuf, host: &HostSection) -> Self {
        Self {
            root,
            debouncer: Debouncer::new(Duration::from_millis(host.debounce_ms)),
            echoes: SelfWrites::default(),
            running: HashMap::new(),
            held: HashSet::new(),
            tool_rewrites: host.tool_rewrites,
        }
    }

    pub(crate) fn on_write(&mut self, path: PathBuf, now: Instant) {
        if !is_ignored(&self.root, &path) {
            self.debouncer.touch(normalize_path(&path), now);
        }
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.next_deadline()
    }

    /// Paths whose writes have settled and have no run in flight.
    pub(crate) fn take_due(&mut self, now: Instant) -> Vec<PathBuf> {
        let mut ready = Vec::new();
        for path in self.debouncer.take_due(now) {
            if self.running.contains_key(&path) {
                self.held.insert(path);
            } else {
                ready.push(path);
            }
        }
        ready
    }

    /// Mark a run as started from content `hash`. Returns false when the
    /// content is what the tool's previous run left behind.
    pub(crate) fn start(&mut self, path: &Path, hash: String) -> bool {
        if self.echoes.is_echo(path, &hash) {
            return false;
        }
        self.running.insert(path.to_path_buf(), hash);
        true
    }

    /// Mark a run as finished, `after` being the file's content hash now.
    pub(crate) fn finish(&mut self, path: &Path, after: Option<String>, now: Instant) {
        let before = self.running.remove(path);
        if self.tool_rewrites {
            if let (Some(before), Some(after)) = (before, after) {
                if before != after {
                    self.echoes.record(path.to_path_buf(), after);
                }
            }
        }
        if self.held.remove(path) {
            self.debouncer.touch(path.to_path_buf(), now);
        }
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.running.len()
    }
}

/// Per-path trailing-edge debounce.
#[derive(Debug)]
pub(crate) struct Debouncer {
    delay: Duration,
    pending: HashMap<PathBuf, Instant>,
}

impl Debouncer {
    pub(crate) fn new(delay: Duration) -> Self {
        Self { delay, pending: HashMap::new() }
    }

    /// Record a write; pushes the path's deadline out by the delay.
    pub(crate) fn touch(&mut self, path: PathBuf, now: Instant) {
        self.pending.insert(path, now + self.delay);
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Remove and return every path whose deadline has passed, in path order.
    pub(crate) fn take_due(&mut self, now: Instant) -> Vec<PathBuf> {
        let mut due: Vec<PathBuf> =
            self.pending.iter().filter(|(_, at)| **at <= now).map(|(p, _)| p.clone()).collect();
        for path in &due {
            self.pending.remove(path);
        }
        due.sort();
        due
    }
}

/// Content hashes of files as the tool left them.
#[derive(Debug, Default)]
pub(crate) struct SelfWrites {
    after_run: HashMap<PathBuf, String>,
}

impl SelfWrites {
    pub(crate) fn record(&mut self, path: PathBuf, hash: String) {
        self.after_run.insert(path, hash);
    }

    /// True when `hash` matches what the last run left behind. Each record
    /// suppresses at most one event.
    pub(crate) fn is_echo(&mut self, path: &Path, hash: &str) -> bool {
        self.after_run.remove(path).is_some_and(|h| h == hash)
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
