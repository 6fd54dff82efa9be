// src/watch/event.rs

//! Raw filesystem events and the merged signal stream consumed by the watch
//! loops.

use std::path::PathBuf;
use std::time::SystemTime;

use notify::EventKind;
use notify::event::{ModifyKind, RenameMode};

/// Operation carried by a [`RawEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventOp {
    Create,
    Write,
    Remove,
    Rename,
    Chmod,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub path: PathBuf,
    pub op: EventOp,
    pub timestamp: SystemTime,
}

impl RawEvent {
    pub fn new(path: impl Into<PathBuf>, op: EventOp) -> Self {
        Self {
            path: path.into(),
            op,
            timestamp: SystemTime::now(),
        }
    }
}

/// One item of the stream a watch loop consumes: either an event or an
/// error reported by the notification backend. Both arrive on the same
/// channel in delivery order; neither kind takes priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchSignal {
    Event(RawEvent),
    Error(String),
}

/// Split a `notify` event into one `RawEvent` per path.
///
/// A rename *into* a path counts as a creation of that path: this is how the
/// volume's atomic writer publishes `..data` (`rename(..data_tmp, ..data)`).
/// Backends that pair both sides of a rename also report the destination on
/// its own as `RenameMode::To`, so the paired event only yields renames.
pub fn raw_events_from_notify(event: &notify::Event) -> Vec<RawEvent> {
    match event.kind {
        // Backends that cannot tell the two sides apart (e.g. FSEvents):
        // whichever side still exists is the destination.
        EventKind::Modify(ModifyKind::Name(RenameMode::Any | RenameMode::Other)) => event
            .paths
            .iter()
            .map(|path| {
                let op = if path.symlink_metadata().is_ok() {
                    EventOp::Create
                } else {
                    EventOp::Rename
                };
                RawEvent::new(path.clone(), op)
            })
            .collect(),
        _ => {
            let op = op_from_kind(&event.kind);
            event
                .paths
                .iter()
                .map(|path| RawEvent::new(path.clone(), op))
                .collect()
        }
    }
}

fn op_from_kind(kind: &EventKind) -> EventOp {
    match kind {
        EventKind::Create(_) => EventOp::Create,
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => EventOp::Create,
        EventKind::Modify(ModifyKind::Name(_)) => EventOp::Rename,
        EventKind::Modify(ModifyKind::Metadata(_)) => EventOp::Chmod,
        EventKind::Modify(_) => EventOp::Write,
        EventKind::Remove(_) => EventOp::Remove,
        EventKind::Access(_) | EventKind::Any | EventKind::Other => EventOp::Other,
    }
}
