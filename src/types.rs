use std::fmt;
use std::path::PathBuf;

/// How a watched directory is treated when its content is swapped.
///
/// - `Plain`: the directory is watched directly; qualifying events go
///   straight to the webhook dispatcher.
/// - `Archive`: the directory holds `.gz` payloads that are extracted once at
///   startup and again before every notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchMode {
    Plain,
    Archive,
}

impl WatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchMode::Plain => "plain",
            WatchMode::Archive => "archive",
        }
    }
}

impl fmt::Display for WatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directory tagged with its watch mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    pub path: PathBuf,
    pub mode: WatchMode,
}

impl WatchTarget {
    pub fn new(path: impl Into<PathBuf>, mode: WatchMode) -> Self {
        Self {
            path: path.into(),
            mode,
        }
    }
}
