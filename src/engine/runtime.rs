// src/engine/runtime.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::archive::Extractor;
use crate::config::ReloaderConfig;
use crate::errors::Result;
use crate::metrics::ReloaderMetrics;
use crate::time::{Sleeper, TokioSleeper};
use crate::types::WatchMode;
use crate::watch::{WatchLoop, WatchSignal, start_os_watcher};
use crate::webhook::{Dispatcher, ReqwestTransport};

use super::{RunOutcome, WatchSession};

/// Wires the validated configuration to the extractor, the watchers and the
/// webhook dispatcher.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: Arc<ReloaderConfig>,
    dispatcher: Arc<Dispatcher>,
    extractor: Arc<Extractor>,
    metrics: Arc<ReloaderMetrics>,
    sleeper: Arc<dyn Sleeper>,
}

impl Orchestrator {
    /// Production wiring: `reqwest` transport, tokio sleeps, real filesystem.
    pub fn new(config: Arc<ReloaderConfig>, metrics: Arc<ReloaderMetrics>) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(config.request_timeout())?);
        let sleeper: Arc<dyn Sleeper> = Arc::new(TokioSleeper);
        let dispatcher = Arc::new(Dispatcher::new(
            transport,
            Arc::clone(&sleeper),
            Arc::clone(&metrics),
            config.backoff(),
        ));
        let extractor = Arc::new(Extractor::new(config.dir_for_unarchive()));
        Ok(Self::with_components(
            config, dispatcher, extractor, metrics, sleeper,
        ))
    }

    pub fn with_components(
        config: Arc<ReloaderConfig>,
        dispatcher: Arc<Dispatcher>,
        extractor: Arc<Extractor>,
        metrics: Arc<ReloaderMetrics>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            config,
            dispatcher,
            extractor,
            metrics,
            sleeper,
        }
    }

    pub fn config(&self) -> &ReloaderConfig {
        &self.config
    }

    /// Run the startup sequence.
    ///
    /// 1. start the plain watcher, if plain directories are configured;
    /// 2. extract every archive directory once (any failure aborts);
    /// 3. in init mode, stop and report completion;
    /// 4. otherwise start the archive watcher.
    ///
    /// Registration and initial extraction errors are returned after
    /// anything already started has been shut down.
    pub async fn start(&self) -> Result<RunOutcome> {
        let mut session = WatchSession::new(CancellationToken::new());

        if self.config.has_dirs(WatchMode::Plain) {
            if let Err(err) = self.spawn_watch(WatchMode::Plain, &mut session) {
                session.shutdown().await;
                return Err(err);
            }
        }

        if self.config.has_dirs(WatchMode::Archive) {
            if let Err(err) = self.initial_extraction().await {
                session.shutdown().await;
                return Err(err);
            }

            if self.config.init_mode() {
                session.shutdown().await;
                info!("init mode completed");
                return Ok(RunOutcome::InitCompleted);
            }

            if let Err(err) = self.spawn_watch(WatchMode::Archive, &mut session) {
                session.shutdown().await;
                return Err(err);
            }
        }

        Ok(RunOutcome::Watching(session))
    }

    async fn initial_extraction(&self) -> Result<()> {
        let dirs: Vec<PathBuf> = self
            .config
            .dirs(WatchMode::Archive)
            .map(|d| d.to_path_buf())
            .collect();

        for dir in dirs {
            info!(dir = ?dir, dest = ?self.extractor.dest_dir(), "extracting archive directory");
            let extractor = Arc::clone(&self.extractor);
            tokio::task::spawn_blocking(move || extractor.extract_dir(&dir))
                .await
                .map_err(|e| anyhow!("extraction task failed: {e}"))??;
        }
        Ok(())
    }

    fn spawn_watch(&self, mode: WatchMode, session: &mut WatchSession) -> Result<()> {
        let dirs: Vec<PathBuf> = self.config.dirs(mode).map(|d| d.to_path_buf()).collect();

        let (signal_tx, signal_rx) = mpsc::unbounded_channel::<WatchSignal>();
        let watcher = start_os_watcher(mode, dirs, signal_tx)?;

        let watch_loop = WatchLoop::new(
            mode,
            Arc::clone(&self.config),
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.extractor),
            Arc::clone(&self.metrics),
            Arc::clone(&self.sleeper),
        );
        let task = tokio::spawn(watch_loop.run(signal_rx, session.cancel_token().child_token()));

        session.push(watcher, task);
        Ok(())
    }
}
