// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind, RenameMode};
use savehook_adapters::{FakeProcessRunner, FakeResultSink, NoWorkspace, TokioProcessRunner};
use savehook_core::ToolInvocationConfig;
use savehook_engine::{PipelineDeps, PipelineOptions};
use tokio::sync::oneshot;

#[yare::parameterized(
    create = { EventKind::Create(CreateKind::File), true },
    modify_data = { EventKind::Modify(ModifyKind::Data(DataChange::Content)), true },
    modify_any = { EventKind::Modify(ModifyKind::Any), true },
    rename_into_place = { EventKind::Modify(ModifyKind::Name(RenameMode::To)), true },
    chmod = { EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)), false },
    remove = { EventKind::Remove(RemoveKind::File), false },
    access = { EventKind::Access(AccessKind::Any), false },
)]
fn write_events(kind: EventKind, expected: bool) {
    assert_eq!(is_write(&kind), expected);
}

#[yare::parameterized(
    source = { "/proj/cmd/main.go", false },
    git_dir = { "/proj/.git/index", true },
    swap_file = { "/proj/cmd/.main.go.swp", true },
    outside_root = { "/other/main.go", false },
)]
fn ignored_paths(path: &str, expected: bool) {
    assert_eq!(is_ignored(Path::new("/proj"), Path::new(path)), expected);
}

#[test]
fn hidden_watch_root_is_not_ignored() {
    assert!(!is_ignored(Path::new("/home/me/.config/app"), Path::new("/home/me/.config/app/main.go")));
}

#[test]
fn debouncer_coalesces_bursts() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new(Duration::from_millis(200));

    debouncer.touch(PathBuf::from("/p/a.go"), start);
    debouncer.touch(PathBuf::from("/p/a.go"), start + Duration::from_millis(150));
    assert_eq!(debouncer.next_deadline(), Some(start + Duration::from_millis(350)));

    assert!(debouncer.take_due(start + Duration::from_millis(300)).is_empty());
    assert_eq!(
        debouncer.take_due(start + Duration::from_millis(350)),
        vec![PathBuf::from("/p/a.go")]
    );
    assert_eq!(debouncer.next_deadline(), None);
}

#[test]
fn debouncer_releases_only_due_paths() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new(Duration::from_millis(100));
    debouncer.touch(PathBuf::from("/p/b.go"), start);
    debouncer.touch(PathBuf::from("/p/a.go"), start);
    debouncer.touch(PathBuf::from("/p/c.go"), start + Duration::from_millis(80));

    let due = debouncer.take_due(start + Duration::from_millis(100));
    assert_eq!(due, vec![PathBuf::from("/p/a.go"), PathBuf::from("/p/b.go")]);
    assert_eq!(debouncer.next_deadline(), Some(start + Duration::from_millis(180)));
}

#[test]
fn tool_write_is_suppressed_once() {
    let mut echoes = SelfWrites::default();
    let path = Path::new("/p/main.go");
    echoes.record(path.to_path_buf(), "abc".to_string());

    assert!(echoes.is_echo(path, "abc"));
    assert!(!echoes.is_echo(path, "abc"));
}

#[test]
fn user_edit_after_run_is_not_suppressed() {
    let mut echoes = SelfWrites::default();
    let path = Path::new("/p/main.go");
    echoes.record(path.to_path_buf(), "formatted".to_string());

    assert!(!echoes.is_echo(path, "edited"));
    assert!(!echoes.is_echo(Path::new("/p/other.go"), "formatted"));
}

#[tokio::test]
async fn content_hash_tracks_file_content() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("main.go");
    std::fs::write(&file, "package main\n").unwrap();
    let first = content_hash(&file).await.unwrap();
    assert_eq!(first.len(), 64);
    assert_eq!(content_hash(&file).await, Some(first.clone()));

    std::fs::write(&file, "package main\n\nfunc main() {}\n").unwrap();
    assert_ne!(content_hash(&file).await, Some(first));

    assert_eq!(content_hash(dir.path()).await, None);
    assert_eq!(content_hash(&dir.path().join("missing.go")).await, None);
}

// ---------------------------------------------------------------------------
// WatchState
// ---------------------------------------------------------------------------

const DELAY: Duration = Duration::from_millis(100);

fn state(tool_rewrites: bool) -> WatchState {
    let host = HostSection { debounce_ms: 100, tool_rewrites, ..HostSection::default() };
    WatchState::new(PathBuf::from("/proj"), &host)
}

#[test]
fn burst_of_writes_is_one_save() {
    let start = Instant::now();
    let mut state = state(false);
    for ms in [0, 20, 40, 60] {
        state.on_write(PathBuf::from("/proj/main.go"), start + Duration::from_millis(ms));
    }
    state.on_write(PathBuf::from("/proj/.git/index"), start);

    assert!(state.take_due(start + DELAY).is_empty());
    assert_eq!(state.take_due(start + Duration::from_millis(160)), vec![PathBuf::from("/proj/main.go")]);
    assert_eq!(state.next_deadline(), None);
}

#[test]
fn write_paths_are_normalized() {
    let start = Instant::now();
    let mut state = state(false);
    state.on_write(PathBuf::from("/proj/./main.go"), start);
    state.on_write(PathBuf::from("/proj/cmd/../main.go"), start);
    assert_eq!(state.take_due(start + DELAY), vec![PathBuf::from("/proj/main.go")]);
}

#[yare::parameterized(
    plain_tool = { false },
    rewriting_tool = { true },
)]
fn save_during_run_is_checked_after_it(tool_rewrites: bool) {
    let path = Path::new("/proj/main.go");
    let start = Instant::now();
    let mut state = state(tool_rewrites);

    state.on_write(path.to_path_buf(), start);
    assert_eq!(state.take_due(start + DELAY), vec![path.to_path_buf()]);
    assert!(state.start(path, "v1".into()));
    assert_eq!(state.in_flight(), 1);

    // Saved again while the tool is still running on v1.
    let mid_run = start + Duration::from_millis(150);
    state.on_write(path.to_path_buf(), mid_run);
    assert!(state.take_due(mid_run + DELAY).is_empty());
    assert_eq!(state.next_deadline(), None);

    // The tool left the file alone; the new content is the user's.
    let finished = start + Duration::from_millis(400);
    state.finish(path, Some("v1".into()), finished);
    assert_eq!(state.in_flight(), 0);
    assert_eq!(state.take_due(finished + DELAY), vec![path.to_path_buf()]);
    assert!(state.start(path, "v2".into()));
}

#[test]
fn plain_tool_never_records_its_writes() {
    let path = Path::new("/proj/main.go");
    let start = Instant::now();
    let mut state = state(false);

    assert!(state.start(path, "v1".into()));
    state.on_write(path.to_path_buf(), start);
    assert!(state.take_due(start + DELAY).is_empty());
    state.finish(path, Some("v2".into()), start + DELAY);

    assert_eq!(state.take_due(start + DELAY * 2), vec![path.to_path_buf()]);
    assert!(state.start(path, "v2".into()));
}

#[test]
fn rewriting_tool_output_is_skipped_once() {
    let path = Path::new("/proj/main.go");
    let start = Instant::now();
    let mut state = state(true);

    assert!(state.start(path, "raw".into()));
    state.on_write(path.to_path_buf(), start);
    state.finish(path, Some("formatted".into()), start + DELAY);

    assert_eq!(state.take_due(start + DELAY * 2), vec![path.to_path_buf()]);
    assert!(!state.start(path, "formatted".into()));
    assert_eq!(state.in_flight(), 0);

    state.on_write(path.to_path_buf(), start + DELAY * 3);
    assert_eq!(state.take_due(start + DELAY * 4), vec![path.to_path_buf()]);
    assert!(state.start(path, "formatted".into()));
}

#[test]
fn unchanged_content_records_no_tool_write() {
    let path = Path::new("/proj/main.go");
    let mut state = state(true);

    assert!(state.start(path, "v1".into()));
    state.finish(path, Some("v1".into()), Instant::now());
    assert!(state.start(path, "v1".into()));
}

// ---------------------------------------------------------------------------
// watch_loop
// ---------------------------------------------------------------------------

struct Watched {
    dir: tempfile::TempDir,
    file: PathBuf,
    settings: Settings,
}

fn watched(tool_rewrites: bool) -> Watched {
    let dir = tempfile::tempdir().unwrap();
    let file = normalize_path(&dir.path().join("main.go"));
    let mut settings = Settings::default();
    settings.host.debounce_ms = 20;
    settings.host.tool_rewrites = tool_rewrites;
    Watched { dir, file, settings }
}

fn pipeline_for<R: ProcessRunner>(
    runner: R,
    sink: &FakeResultSink,
    config: ToolInvocationConfig,
) -> Arc<SaveTriggeredPipeline<R, FakeResultSink, fn(&SaveEvent) -> bool, NoWorkspace>> {
    let accept_all: fn(&SaveEvent) -> bool = |_| true;
    let deps = PipelineDeps { runner, sink: sink.clone(), filter: accept_all, resolver: NoWorkspace };
    Arc::new(SaveTriggeredPipeline::new(config, deps, PipelineOptions::default()))
}

async fn wait_for(what: &str, done: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn save_during_run_is_run_after_it() {
    let w = watched(false);
    let runner = FakeProcessRunner::new();
    runner.set_delay(Duration::from_millis(300));
    let sink = FakeResultSink::new();
    let config = ToolInvocationConfig::new("lint").unwrap();
    let pipeline = pipeline_for(runner.clone(), &sink, config);

    let (tx, rx) = mpsc::channel(16);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let state = WatchState::new(normalize_path(w.dir.path()), &w.settings.host);
    let driver = async {
        std::fs::write(&w.file, "v1").unwrap();
        tx.send(w.file.clone()).await.unwrap();
        wait_for("first run", || runner.calls().len() == 1).await;

        std::fs::write(&w.file, "v2").unwrap();
        tx.send(w.file.clone()).await.unwrap();
        wait_for("second report", || sink.reports().len() == 2).await;
        let _ = stop_tx.send(());
    };
    let shutdown = async {
        let _ = stop_rx.await;
    };
    tokio::join!(watch_loop(pipeline, &w.settings, state, rx, shutdown), driver);

    assert_eq!(runner.calls().len(), 2);
    assert_eq!(runner.peak_concurrency_for(w.file.clone()), 1);
}

#[tokio::test]
async fn burst_of_writes_runs_the_tool_once() {
    let w = watched(false);
    let runner = FakeProcessRunner::new();
    let sink = FakeResultSink::new();
    let pipeline = pipeline_for(runner.clone(), &sink, ToolInvocationConfig::new("lint").unwrap());

    let (tx, rx) = mpsc::channel(16);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let state = WatchState::new(normalize_path(w.dir.path()), &w.settings.host);
    let driver = async {
        std::fs::write(&w.file, "package main\n").unwrap();
        for _ in 0..5 {
            tx.send(w.file.clone()).await.unwrap();
        }
        wait_for("report", || sink.reports().len() == 1).await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        let _ = stop_tx.send(());
    };
    let shutdown = async {
        let _ = stop_rx.await;
    };
    tokio::join!(watch_loop(pipeline, &w.settings, state, rx, shutdown), driver);

    assert_eq!(runner.calls().len(), 1);
    assert_eq!(sink.reports().len(), 1);
}

#[cfg(unix)]
#[tokio::test]
async fn rewriting_tool_does_not_trigger_itself() {
    let w = watched(true);
    let sink = FakeResultSink::new();
    let config = ToolInvocationConfig::new("/bin/sh")
        .unwrap()
        .fixed_args(["-c", "printf formatted > \"$0\""]);
    let pipeline = pipeline_for(TokioProcessRunner::new(), &sink, config);

    let (tx, rx) = mpsc::channel(16);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let state = WatchState::new(normalize_path(w.dir.path()), &w.settings.host);
    let driver = async {
        std::fs::write(&w.file, "raw").unwrap();
        tx.send(w.file.clone()).await.unwrap();
        wait_for("first report", || sink.reports().len() == 1).await;
        assert_eq!(std::fs::read_to_string(&w.file).unwrap(), "formatted");

        // The event for the tool's own write.
        tx.send(w.file.clone()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(sink.reports().len(), 1);

        std::fs::write(&w.file, "edited").unwrap();
        tx.send(w.file.clone()).await.unwrap();
        wait_for("second report", || sink.reports().len() == 2).await;
        let _ = stop_tx.send(());
    };
    let shutdown = async {
        let _ = stop_rx.await;
    };
    tokio::join!(watch_loop(pipeline, &w.settings, state, rx, shutdown), driver);

    assert!(sink.reports().iter().all(|r| !r.is_error()), "{:?}", sink.reports());
}
