// src/archive/extractor.rs

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flate2::read::GzDecoder;
use tracing::{debug, info};

use crate::errors::{ReloaderError, Result};
use crate::fs::{FileSystem, RealFileSystem};

/// Suffix an entry must carry to be treated as an archive.
pub const ARCHIVE_SUFFIX: &str = ".gz";

/// Gunzips archives into a fixed destination directory.
#[derive(Debug, Clone)]
pub struct Extractor {
    dest_dir: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl Extractor {
    pub fn new(dest_dir: impl Into<PathBuf>) -> Self {
        Self::with_fs(dest_dir, Arc::new(RealFileSystem))
    }

    pub fn with_fs(dest_dir: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            dest_dir: dest_dir.into(),
            fs,
        }
    }

    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    /// Extract every immediate entry of `dir`, stopping at the first failure.
    ///
    /// Entries starting with `..` belong to the volume's atomic-update
    /// machinery (`..data`, `..2024_01_01_...`) and are skipped.
    pub fn extract_dir(&self, dir: &Path) -> Result<()> {
        let entries = self.fs.read_dir(dir).map_err(|source| ReloaderError::Archive {
            path: dir.to_path_buf(),
            source,
        })?;

        for entry in entries {
            if is_hidden_entry(&entry) {
                debug!(path = ?entry, "skipping volume bookkeeping entry");
                continue;
            }
            self.extract_file(&entry)?;
        }
        Ok(())
    }

    /// Gunzip `path` into `<dest_dir>/<file name without .gz>`.
    ///
    /// A path without the `.gz` suffix is rejected before anything is opened
    /// or written.
    pub fn extract_file(&self, path: &Path) -> Result<()> {
        let out_name = match stripped_name(path) {
            Some(name) => name,
            None => return Err(ReloaderError::NotAnArchive(path.to_path_buf())),
        };
        let out_path = self.dest_dir.join(out_name);

        let io_err = |source| ReloaderError::Archive {
            path: path.to_path_buf(),
            source,
        };

        let source = self.fs.open_read(path).map_err(io_err)?;
        // Volume payloads are small (ConfigMaps/Secrets cap at 1 MiB), so the
        // stream is decoded fully before the destination is touched.
        let mut decoded = Vec::new();
        GzDecoder::new(source)
            .read_to_end(&mut decoded)
            .map_err(io_err)?;

        self.fs.create_dir_all(&self.dest_dir).map_err(io_err)?;
        let written = self
            .fs
            .write_from(&out_path, &mut decoded.as_slice())
            .map_err(io_err)?;

        info!(source = ?path, dest = ?out_path, bytes = written, "extracted archive");
        Ok(())
    }

    /// Extract whatever the event path points at.
    ///
    /// The `..data` marker is a symlink to the new snapshot directory, so a
    /// directory is extracted entry by entry; anything else is treated as a
    /// single archive.
    pub fn extract_path(&self, path: &Path) -> Result<()> {
        if self.fs.is_dir(path) {
            self.extract_dir(path)
        } else {
            self.extract_file(path)
        }
    }
}

/// True for names like `..data` or `..2024_05_01_12_00_00.123`.
pub fn is_hidden_entry(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(".."))
}

fn stripped_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_suffix(ARCHIVE_SUFFIX)?;
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}
