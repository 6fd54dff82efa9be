// tests/watch_loop.rs

mod common;
use crate::common::builders::RawConfigBuilder;
use crate::common::fakes::{RecordingSleeper, ScriptedTransport};
use crate::common::{gzip, init_tracing, metrics, with_timeout};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use config_reloader::archive::Extractor;
use config_reloader::fs::mock::MockFileSystem;
use config_reloader::metrics::ReloaderMetrics;
use config_reloader::types::WatchMode;
use config_reloader::watch::{EventOp, RawEvent, SignalOutcome, WatchLoop, WatchSignal};
use config_reloader::webhook::Dispatcher;

const HOOK: &str = "http://localhost:9090/-/reload";

struct Harness {
    watch_loop: WatchLoop,
    transport: ScriptedTransport,
    sleeper: RecordingSleeper,
    metrics: Arc<ReloaderMetrics>,
    fs: Arc<MockFileSystem>,
}

fn harness(mode: WatchMode) -> Harness {
    init_tracing();
    let builder = RawConfigBuilder::new()
        .webhook_url(HOOK)
        .dir_for_unarchive("/out")
        .archive_pacing_secs(10)
        .backoff_secs(1);
    let builder = match mode {
        WatchMode::Plain => builder.volume_dir("/vol"),
        WatchMode::Archive => builder.volume_dir_archive("/vol"),
    };
    let config = Arc::new(builder.build());

    let transport = ScriptedTransport::always(200);
    let sleeper = RecordingSleeper::new();
    let metrics = metrics();
    let fs = Arc::new(MockFileSystem::new());

    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(transport.clone()),
        Arc::new(sleeper.clone()),
        Arc::clone(&metrics),
        config.backoff(),
    ));
    let extractor = Arc::new(Extractor::with_fs("/out", fs.clone()));

    let watch_loop = WatchLoop::new(
        mode,
        config,
        dispatcher,
        extractor,
        Arc::clone(&metrics),
        Arc::new(sleeper.clone()),
    );

    Harness {
        watch_loop,
        transport,
        sleeper,
        metrics,
        fs,
    }
}

fn data_created() -> WatchSignal {
    WatchSignal::Event(RawEvent::new("/vol/..data", EventOp::Create))
}

#[tokio::test]
async fn plain_mode_notifies_on_data_marker() {
    let h = harness(WatchMode::Plain);

    let outcome = h.watch_loop.handle_signal(data_created()).await;

    match outcome {
        SignalOutcome::Notified { extracted, reports } => {
            assert_eq!(extracted, None);
            assert_eq!(reports.len(), 1);
            assert!(reports[0].is_success());
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(h.transport.request_count(), 1);
}

#[tokio::test]
async fn non_qualifying_events_are_ignored() {
    let h = harness(WatchMode::Plain);

    for signal in [
        WatchSignal::Event(RawEvent::new("/vol/app.yaml", EventOp::Create)),
        WatchSignal::Event(RawEvent::new("/vol/..data", EventOp::Remove)),
        WatchSignal::Event(RawEvent::new("/vol/..data_tmp", EventOp::Rename)),
    ] {
        assert_eq!(h.watch_loop.handle_signal(signal).await, SignalOutcome::Ignored);
    }
    assert_eq!(h.transport.request_count(), 0);
}

#[tokio::test]
async fn watcher_errors_are_counted_and_skipped() {
    let h = harness(WatchMode::Plain);

    let outcome = h
        .watch_loop
        .handle_signal(WatchSignal::Error("inotify queue overflow".into()))
        .await;

    assert_eq!(outcome, SignalOutcome::WatcherError);
    assert_eq!(h.metrics.watcher_errors(), 1);
    assert_eq!(h.transport.request_count(), 0);
}

#[tokio::test]
async fn archive_mode_re_extracts_before_notifying() {
    let h = harness(WatchMode::Archive);
    h.fs.add_file("/vol/..data/app.yaml.gz", gzip(b"v2"));

    let outcome = h.watch_loop.handle_signal(data_created()).await;

    match outcome {
        SignalOutcome::Notified { extracted, reports } => {
            assert_eq!(extracted, Some(true));
            assert!(reports[0].is_success());
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(h.fs.file("/out/app.yaml"), Some(b"v2".to_vec()));
}

#[tokio::test]
async fn archive_extraction_failure_still_notifies() {
    let h = harness(WatchMode::Archive);
    h.fs.add_file("/vol/..data/broken.gz", b"not gzip".to_vec());

    let outcome = h.watch_loop.handle_signal(data_created()).await;

    match outcome {
        SignalOutcome::Notified { extracted, .. } => assert_eq!(extracted, Some(false)),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(h.transport.request_count(), 1);
}

#[tokio::test]
async fn run_stops_when_stream_closes() {
    let h = harness(WatchMode::Plain);
    let (tx, rx) = mpsc::unbounded_channel();

    tx.send(data_created()).unwrap();
    tx.send(WatchSignal::Event(RawEvent::new("/vol/other", EventOp::Create)))
        .unwrap();
    tx.send(data_created()).unwrap();
    drop(tx);

    with_timeout(h.watch_loop.clone().run(rx, CancellationToken::new())).await;

    assert_eq!(h.transport.request_count(), 2);
    // Plain mode never paces.
    assert!(h.sleeper.sleeps().is_empty());
}

#[tokio::test]
async fn archive_mode_paces_after_every_signal() {
    let h = harness(WatchMode::Archive);
    h.fs.add_file("/vol/..data/a.gz", gzip(b"a"));
    let (tx, rx) = mpsc::unbounded_channel();

    tx.send(WatchSignal::Error("boom".into())).unwrap();
    tx.send(WatchSignal::Event(RawEvent::new("/vol/ignored", EventOp::Write)))
        .unwrap();
    tx.send(data_created()).unwrap();
    drop(tx);

    with_timeout(h.watch_loop.clone().run(rx, CancellationToken::new())).await;

    assert_eq!(h.sleeper.sleeps(), vec![Duration::from_secs(10); 3]);
    assert_eq!(h.metrics.watcher_errors(), 1);
    assert_eq!(h.transport.request_count(), 1);
}

#[tokio::test]
async fn run_stops_on_cancellation() {
    let h = harness(WatchMode::Plain);
    let (tx, rx) = mpsc::unbounded_channel::<WatchSignal>();
    let cancel = CancellationToken::new();

    let task = tokio::spawn(h.watch_loop.clone().run(rx, cancel.clone()));
    cancel.cancel();
    with_timeout(task).await.unwrap();

    // The receiver went away with the loop.
    assert!(tx.send(data_created()).is_err());
    assert_eq!(h.transport.request_count(), 0);
}
