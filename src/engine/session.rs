// src/engine/session.rs

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::types::WatchMode;
use crate::watch::WatcherHandle;

/// Everything launched for a watching run: the OS watchers (which must stay
/// alive) and the loop tasks consuming their signals.
#[derive(Debug)]
pub struct WatchSession {
    cancel: CancellationToken,
    watchers: Vec<WatcherHandle>,
    tasks: Vec<JoinHandle<()>>,
}

impl WatchSession {
    pub(crate) fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            watchers: Vec::new(),
            tasks: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, watcher: WatcherHandle, task: JoinHandle<()>) {
        self.watchers.push(watcher);
        self.tasks.push(task);
    }

    /// Token cancelled by [`shutdown`](Self::shutdown); other components
    /// (e.g. the metrics server) may share it.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Modes with a running watch loop.
    pub fn modes(&self) -> Vec<WatchMode> {
        self.watchers.iter().map(|w| w.mode()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Stop the loops and release the OS watch subscriptions.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for task in self.tasks {
            if let Err(err) = task.await {
                warn!(error = %err, "watch loop task ended abnormally");
            }
        }
        drop(self.watchers);
        debug!("watch session shut down");
    }
}
