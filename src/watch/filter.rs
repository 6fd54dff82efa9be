// src/watch/filter.rs

use std::path::Path;

use crate::watch::event::{EventOp, RawEvent};

/// Name of the symlink the volume's atomic writer repoints on every update.
pub const DATA_MARKER: &str = "..data";

/// True only for the creation of a `..data` entry, in any directory.
///
/// Every other event in a projected volume (snapshot creation, cleanup of
/// the previous snapshot, chmods, ...) is a side effect of the same swap.
pub fn is_qualifying(event: &RawEvent) -> bool {
    event.op == EventOp::Create && is_data_marker(&event.path)
}

fn is_data_marker(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name == DATA_MARKER)
}
