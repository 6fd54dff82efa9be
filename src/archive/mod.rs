// src/archive/mod.rs

//! Decompression of `.gz` payloads found in archive-mode volumes.
//!
//! The extractor is a leaf component: it knows nothing about watching or
//! webhooks. The orchestrator runs it once per archive directory at startup,
//! and the archive watcher runs it again on every qualifying event.

pub mod extractor;

pub use extractor::{ARCHIVE_SUFFIX, Extractor, is_hidden_entry};
