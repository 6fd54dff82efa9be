// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Turning `notify` events into [`RawEvent`]s on a single merged
//!   [`WatchSignal`] stream (`event.rs`, `watcher.rs`).
//! - Deciding which events are genuine volume swaps (`filter.rs`).
//! - Running the per-mode loop that re-extracts archives and dispatches
//!   webhooks (`event_loop.rs`).

pub mod event;
pub mod event_loop;
pub mod filter;
pub mod watcher;

pub use event::{EventOp, RawEvent, WatchSignal, raw_events_from_notify};
pub use event_loop::{SignalOutcome, WatchLoop};
pub use filter::{DATA_MARKER, is_qualifying};
pub use watcher::{WatcherHandle, start_os_watcher};
