// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External tool execution with combined output capture and a timeout.

use async_trait::async_trait;
use parking_lot::Mutex;
use savehook_core::{CommandSpec, ExecutionResult, NO_EXIT_CODE};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// How long output readers may keep draining after the process is gone.
///
/// A grandchild that inherited the pipes can keep them open forever; after
/// this grace period the readers are abandoned.
pub const DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Runs one external process per call.
///
/// Never fails: every way a run can go wrong is encoded in the returned
/// [`ExecutionResult`].
#[async_trait]
pub trait ProcessRunner: Clone + Send + Sync + 'static {
    async fn run(&self, spec: &CommandSpec, timeout: Duration) -> ExecutionResult;
}

/// Runner backed by `tokio::process`.
#[derive(Clone, Debug)]
pub struct TokioProcessRunner {
    max_output_bytes: usize,
    drain_grace: Duration,
}

impl Default for TokioProcessRunner {
    fn default() -> Self {
        Self {
            max_output_bytes: savehook_core::config::DEFAULT_MAX_OUTPUT_BYTES,
            drain_grace: DRAIN_GRACE,
        }
    }
}

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap on captured combined output. Output past the cap is drained and dropped.
    pub fn max_output_bytes(mut self, limit: usize) -> Self {
        self.max_output_bytes = limit;
        self
    }

    pub fn drain_grace(mut self, grace: Duration) -> Self {
        self.drain_grace = grace;
        self
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, spec: &CommandSpec, timeout: Duration) -> ExecutionResult {
        let span = tracing::info_span!(
            "tool.run",
            cmd = %spec.display(),
            exit_code = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        );
        let result = self.execute(spec, timeout).instrument(span.clone()).await;
        span.record("exit_code", result.exit_code);
        span.record("duration_ms", millis(result.duration));
        result
    }
}

impl TokioProcessRunner {
    async fn execute(&self, spec: &CommandSpec, timeout: Duration) -> ExecutionResult {
        let start = Instant::now();
        let mut command = tokio::process::Command::new(&spec.executable);
        command
            .args(&spec.args)
            .envs(&spec.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &spec.current_dir {
            command.current_dir(dir);
        }
        // Own process group so a timeout kill also reaches the tool's children.
        #[cfg(unix)]
        command.process_group(0);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(error = %e, "failed to launch tool");
                return ExecutionResult::launch_failed(e.to_string(), start.elapsed());
            }
        };

        // Both streams drain into one buffer while we wait, so a chatty tool
        // can never block on a full pipe.
        let output = Arc::new(Mutex::new(CombinedOutput::new(self.max_output_bytes)));
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(drain(stdout, Arc::clone(&output))));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(drain(stderr, Arc::clone(&output))));
        }

        let pid = child.id();
        let waited = tokio::time::timeout(timeout, child.wait()).await;
        match waited {
            Ok(Ok(status)) => {
                if !join_readers(readers, self.drain_grace).await {
                    // Something the tool left running still holds a pipe.
                    kill_group(pid);
                }
                let combined = output.lock().take();
                ExecutionResult::exited(exit_code(status), combined, start.elapsed())
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "failed waiting for tool");
                terminate(&mut child).await;
                join_readers(readers, self.drain_grace).await;
                ExecutionResult::launch_failed(format!("wait failed: {e}"), start.elapsed())
            }
            Err(_) => {
                tracing::warn!(timeout_ms = millis(timeout), "tool timed out, killing");
                terminate(&mut child).await;
                join_readers(readers, self.drain_grace).await;
                let combined = output.lock().take();
                ExecutionResult::timed_out(combined, start.elapsed())
            }
        }
    }
}

/// Forcibly stop the child (and its process group on unix), then reap it.
async fn terminate(child: &mut Child) {
    kill_group(child.id());
    if let Err(e) = child.start_kill() {
        tracing::debug!(error = %e, "start_kill failed");
    }
    if let Err(e) = child.wait().await {
        tracing::debug!(error = %e, "failed to reap killed tool");
    }
}

/// SIGKILL the process group led by `pid`. The group outlives its leader, so
/// this also reaches background children after the tool itself exited.
fn kill_group(pid: Option<u32>) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;
        if let Some(pid) = pid.and_then(|pid| i32::try_from(pid).ok()) {
            if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
                tracing::debug!(pid, error = %e, "killpg failed");
            }
        }
    }
    #[cfg(not(unix))]
    let _ = pid;
}

/// Wait for the readers until `grace` runs out. Returns false if any reader
/// had to be abandoned.
async fn join_readers(readers: Vec<JoinHandle<()>>, grace: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + grace;
    let mut drained = true;
    for mut reader in readers {
        if tokio::time::timeout_at(deadline, &mut reader).await.is_err() {
            tracing::debug!("output pipe still open after exit, abandoning reader");
            reader.abort();
            drained = false;
        }
    }
    drained
}

async fn drain<R>(mut reader: R, output: Arc<Mutex<CombinedOutput>>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 8192];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => output.lock().push(&buf[..n]),
            Err(e) => {
                tracing::debug!(error = %e, "output read failed");
                break;
            }
        }
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(NO_EXIT_CODE)
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Interleaved stdout/stderr bytes, capped at `limit`.
#[derive(Debug)]
pub(crate) struct CombinedOutput {
    bytes: Vec<u8>,
    limit: usize,
    truncated: bool,
}

impl CombinedOutput {
    pub(crate) fn new(limit: usize) -> Self {
        Self { bytes: Vec::new(), limit, truncated: false }
    }

    pub(crate) fn push(&mut self, chunk: &[u8]) {
        let room = self.limit.saturating_sub(self.bytes.len());
        if chunk.len() > room {
            self.truncated = true;
        }
        self.bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
    }

    /// Take the captured text, leaving the buffer empty.
    pub(crate) fn take(&mut self) -> String {
        let bytes = std::mem::take(&mut self.bytes);
        let mut text = match std::str::from_utf8(&bytes) {
            Ok(s) => s.to_string(),
            // A cut at the cap can split a multi-byte char; drop the partial tail.
            Err(e) if self.truncated && e.error_len().is_none() => {
                String::from_utf8_lossy(&bytes[..e.valid_up_to()]).into_owned()
            }
            Err(_) => String::from_utf8_lossy(&bytes).into_owned(),
        };
        if self.truncated {
            text.push_str("\n[output truncated]\n");
        }
        text
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::ProcessRunner;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use savehook_core::{CommandSpec, ExecutionResult};
    use std::collections::{HashMap, VecDeque};
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    /// Recorded run
    #[derive(Debug, Clone)]
    pub struct RunCall {
        pub spec: CommandSpec,
        pub timeout: Duration,
    }

    #[derive(Default)]
    struct FakeRunnerState {
        calls: Vec<RunCall>,
        results: VecDeque<ExecutionResult>,
        delay: Option<Duration>,
        active: HashMap<PathBuf, usize>,
        peak: HashMap<PathBuf, usize>,
        active_total: usize,
        peak_total: usize,
    }

    /// Fake runner for testing: scripted results, optional delay, and
    /// concurrency tracking per target file.
    #[derive(Clone, Default)]
    pub struct FakeProcessRunner {
        inner: Arc<Mutex<FakeRunnerState>>,
    }

    impl FakeProcessRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a result for the next run. Runs without a queued result succeed.
        pub fn push_result(&self, result: ExecutionResult) {
            self.inner.lock().results.push_back(result);
        }

        /// Make every run take `delay` before returning.
        pub fn set_delay(&self, delay: Duration) {
            self.inner.lock().delay = Some(delay);
        }

        pub fn calls(&self) -> Vec<RunCall> {
            self.inner.lock().calls.clone()
        }

        /// Highest number of simultaneous runs seen for `target`.
        pub fn peak_concurrency_for(&self, target: impl Into<PathBuf>) -> usize {
            self.inner.lock().peak.get(&target.into()).copied().unwrap_or(0)
        }

        /// Highest number of simultaneous runs seen overall.
        pub fn peak_concurrency(&self) -> usize {
            self.inner.lock().peak_total
        }
    }

    #[async_trait]
    impl ProcessRunner for FakeProcessRunner {
        async fn run(&self, spec: &CommandSpec, timeout: Duration) -> ExecutionResult {
            let target = spec.target().map(PathBuf::from).unwrap_or_default();
            let (delay, result) = {
                let mut state = self.inner.lock();
                state.calls.push(RunCall { spec: spec.clone(), timeout });
                let active = state.active.entry(target.clone()).or_insert(0);
                *active += 1;
                let active = *active;
                let peak = state.peak.entry(target.clone()).or_insert(0);
                *peak = (*peak).max(active);
                state.active_total += 1;
                state.peak_total = state.peak_total.max(state.active_total);
                let result = state
                    .results
                    .pop_front()
                    .unwrap_or_else(|| ExecutionResult::exited(0, String::new(), Duration::ZERO));
                (state.delay, result)
            };

            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let mut state = self.inner.lock();
            if let Some(active) = state.active.get_mut(&target) {
                *active = active.saturating_sub(1);
            }
            state.active_total = state.active_total.saturating_sub(1);
            result
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProcessRunner, RunCall};

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
