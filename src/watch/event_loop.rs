// src/watch/event_loop.rs

//! The per-mode dispatch loop.
//!
//! One `WatchLoop` consumes one merged [`WatchSignal`] stream. It never
//! propagates errors: watcher errors are counted, extraction failures are
//! logged, and webhook failures are handled inside the dispatcher.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::archive::Extractor;
use crate::config::ReloaderConfig;
use crate::metrics::ReloaderMetrics;
use crate::time::Sleeper;
use crate::types::WatchMode;
use crate::watch::event::{RawEvent, WatchSignal};
use crate::watch::filter::is_qualifying;
use crate::webhook::{DispatchReport, Dispatcher};

/// What handling a single signal amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalOutcome {
    /// Not a `..data` creation; dropped silently.
    Ignored,
    /// The backend reported an error; counted and logged.
    WatcherError,
    /// Qualifying event: every destination was notified.
    Notified {
        /// `None` in plain mode, `Some(ok)` after an archive re-extraction.
        extracted: Option<bool>,
        reports: Vec<DispatchReport>,
    },
}

#[derive(Debug, Clone)]
pub struct WatchLoop {
    mode: WatchMode,
    config: Arc<ReloaderConfig>,
    dispatcher: Arc<Dispatcher>,
    extractor: Arc<Extractor>,
    metrics: Arc<ReloaderMetrics>,
    sleeper: Arc<dyn Sleeper>,
}

impl WatchLoop {
    pub fn new(
        mode: WatchMode,
        config: Arc<ReloaderConfig>,
        dispatcher: Arc<Dispatcher>,
        extractor: Arc<Extractor>,
        metrics: Arc<ReloaderMetrics>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            mode,
            config,
            dispatcher,
            extractor,
            metrics,
            sleeper,
        }
    }

    pub fn mode(&self) -> WatchMode {
        self.mode
    }

    /// Main loop.
    ///
    /// Runs until `cancel` fires or the signal stream closes. In archive mode
    /// every iteration, error iterations included, is followed by the
    /// pacing pause; signals arriving meanwhile stay queued in the channel.
    pub async fn run(
        self,
        mut signals: mpsc::UnboundedReceiver<WatchSignal>,
        cancel: CancellationToken,
    ) {
        info!(mode = %self.mode, "watch loop started");

        loop {
            let signal = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(mode = %self.mode, "watch loop cancelled");
                    break;
                }
                signal = signals.recv() => match signal {
                    Some(signal) => signal,
                    None => {
                        debug!(mode = %self.mode, "signal stream closed");
                        break;
                    }
                },
            };

            self.handle_signal(signal).await;

            if self.mode == WatchMode::Archive {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = self.sleeper.sleep(self.config.archive_pacing()) => {}
                }
            }
        }

        info!(mode = %self.mode, "watch loop stopped");
    }

    /// Process one signal to completion.
    pub async fn handle_signal(&self, signal: WatchSignal) -> SignalOutcome {
        match signal {
            WatchSignal::Error(err) => {
                self.metrics.record_watcher_error();
                warn!(mode = %self.mode, error = %err, "file watcher error");
                SignalOutcome::WatcherError
            }
            WatchSignal::Event(event) => {
                if !is_qualifying(&event) {
                    return SignalOutcome::Ignored;
                }
                self.handle_qualifying(event).await
            }
        }
    }

    async fn handle_qualifying(&self, event: RawEvent) -> SignalOutcome {
        debug!(mode = %self.mode, path = ?event.path, "qualifying event");

        let extracted = match self.mode {
            WatchMode::Plain => None,
            WatchMode::Archive => Some(self.re_extract(&event).await),
        };

        let reports = self.dispatcher.notify(self.config.destinations()).await;
        info!(mode = %self.mode, path = ?event.path, "ConfigMap or Secret updated");

        SignalOutcome::Notified { extracted, reports }
    }

    async fn re_extract(&self, event: &RawEvent) -> bool {
        let extractor = Arc::clone(&self.extractor);
        let path = event.path.clone();

        let result = tokio::task::spawn_blocking(move || extractor.extract_path(&path)).await;
        match result {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                error!(path = ?event.path, error = %err, "re-extraction failed");
                false
            }
            Err(join_err) => {
                error!(path = ?event.path, error = %join_err, "re-extraction task panicked");
                false
            }
        }
    }
}
