// tests/event_filter.rs

use std::path::PathBuf;

use notify::event::{CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};
use proptest::prelude::*;

use config_reloader::watch::{DATA_MARKER, EventOp, RawEvent, is_qualifying, raw_events_from_notify};

fn event(path: &str, op: EventOp) -> RawEvent {
    RawEvent::new(path, op)
}

#[test]
fn data_marker_creation_qualifies() {
    assert!(is_qualifying(&event("/etc/config/..data", EventOp::Create)));
    assert!(is_qualifying(&event("..data", EventOp::Create)));
}

#[test]
fn other_ops_on_data_marker_are_ignored() {
    for op in [
        EventOp::Write,
        EventOp::Remove,
        EventOp::Rename,
        EventOp::Chmod,
        EventOp::Other,
    ] {
        assert!(
            !is_qualifying(&event("/etc/config/..data", op)),
            "{op:?} on ..data must not qualify"
        );
    }
}

#[test]
fn lookalike_names_are_ignored() {
    for path in [
        "/etc/config/..data_tmp",
        "/etc/config/..2024_05_01_12_00_00.123456789",
        "/etc/config/data",
        "/etc/config/.data",
        "/etc/config/..data/app.yaml",
        "/etc/config/app.yaml",
    ] {
        assert!(!is_qualifying(&event(path, EventOp::Create)), "{path}");
    }
}

#[test]
fn rename_into_data_marker_is_a_creation() {
    let to = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::To)))
        .add_path(PathBuf::from("/etc/config/..data"));
    let raws = raw_events_from_notify(&to);
    assert_eq!(raws.len(), 1);
    assert_eq!(raws[0].op, EventOp::Create);
    assert!(is_qualifying(&raws[0]));
}

#[test]
fn paired_rename_event_does_not_qualify_twice() {
    // inotify follows the `To` event with a `Both` event for the same rename.
    let both = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
        .add_path(PathBuf::from("/etc/config/..data_tmp"))
        .add_path(PathBuf::from("/etc/config/..data"));

    let raws = raw_events_from_notify(&both);
    assert_eq!(raws.len(), 2);
    assert!(raws.iter().all(|r| r.op == EventOp::Rename));
    assert!(!raws.iter().any(is_qualifying));
}

#[test]
fn ambiguous_rename_uses_existence() -> Result<(), std::io::Error> {
    let dir = tempfile::tempdir()?;
    let present = dir.path().join("..data");
    std::fs::write(&present, b"")?;
    let gone = dir.path().join("..data_tmp");

    let ev = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Any)))
        .add_path(gone.clone())
        .add_path(present.clone());
    let raws = raw_events_from_notify(&ev);

    assert_eq!(raws[0].op, EventOp::Rename);
    assert_eq!(raws[1].op, EventOp::Create);
    assert!(is_qualifying(&raws[1]));
    Ok(())
}

#[test]
fn notify_kinds_map_to_ops() {
    let cases = [
        (EventKind::Create(CreateKind::File), EventOp::Create),
        (
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            EventOp::Write,
        ),
        (
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
            EventOp::Chmod,
        ),
        (
            EventKind::Modify(ModifyKind::Name(RenameMode::From)),
            EventOp::Rename,
        ),
        (EventKind::Remove(RemoveKind::File), EventOp::Remove),
        (EventKind::Access(notify::event::AccessKind::Any), EventOp::Other),
    ];

    for (kind, expected) in cases {
        let label = format!("{kind:?}");
        let ev = Event::new(kind).add_path(PathBuf::from("/etc/config/x"));
        let raws = raw_events_from_notify(&ev);
        assert_eq!(raws.len(), 1);
        assert_eq!(raws[0].op, expected, "{label}");
    }
}

#[test]
fn one_raw_event_per_path() {
    let ev = Event::new(EventKind::Create(CreateKind::Any))
        .add_path(PathBuf::from("/a/..data"))
        .add_path(PathBuf::from("/b/..data"));
    let raws = raw_events_from_notify(&ev);
    let paths: Vec<_> = raws.iter().map(|r| r.path.clone()).collect();
    assert_eq!(paths, vec![PathBuf::from("/a/..data"), PathBuf::from("/b/..data")]);
    assert!(raws.iter().all(is_qualifying));
}

fn op_strategy() -> impl Strategy<Value = EventOp> {
    prop_oneof![
        Just(EventOp::Create),
        Just(EventOp::Write),
        Just(EventOp::Remove),
        Just(EventOp::Rename),
        Just(EventOp::Chmod),
        Just(EventOp::Other),
    ]
}

proptest! {
    #[test]
    fn qualifies_iff_create_of_data_marker(
        dir in "(/[a-z]{1,8}){0,3}",
        name in prop_oneof![Just(DATA_MARKER.to_string()), "[.a-z_0-9]{1,12}"],
        op in op_strategy(),
    ) {
        let path = format!("{dir}/{name}");
        let expected = op == EventOp::Create && name == DATA_MARKER;
        prop_assert_eq!(is_qualifying(&RawEvent::new(&path, op)), expected);
    }
}
