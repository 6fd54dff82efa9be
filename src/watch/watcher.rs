// src/watch/watcher.rs

use std::path::PathBuf;

use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::info;

use crate::errors::Result;
use crate::types::WatchMode;
use crate::watch::event::{WatchSignal, raw_events_from_notify};

/// Handle for an OS-level watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    mode: WatchMode,
    dirs: Vec<PathBuf>,
}

impl WatcherHandle {
    pub fn mode(&self) -> WatchMode {
        self.mode
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("mode", &self.mode)
            .field("dirs", &self.dirs)
            .finish()
    }
}

/// Subscribe to every directory in `dirs` (non-recursively) and forward
/// what the backend reports into `signal_tx` as [`WatchSignal`]s.
///
/// Any registration failure is returned; the caller treats it as fatal.
pub fn start_os_watcher(
    mode: WatchMode,
    dirs: Vec<PathBuf>,
    signal_tx: mpsc::UnboundedSender<WatchSignal>,
) -> Result<WatcherHandle> {
    // Closure called synchronously by notify whenever something arrives.
    // A failed send only means the loop has shut down; nothing to do then.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| match res {
            Ok(event) => {
                for raw in raw_events_from_notify(&event) {
                    let _ = signal_tx.send(WatchSignal::Event(raw));
                }
            }
            Err(err) => {
                let _ = signal_tx.send(WatchSignal::Error(err.to_string()));
            }
        },
        Config::default(),
    )?;

    for dir in &dirs {
        match mode {
            WatchMode::Plain => info!("watching directory: {:?}", dir),
            WatchMode::Archive => info!("watching directory (with unarchive): {:?}", dir),
        }
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
    }

    Ok(WatcherHandle {
        _inner: watcher,
        mode,
        dirs,
    })
}
