//! Version navigation against in-memory and file-backed snapshot stores.

mod helpers;

use helpers::*;
use pipegraph::core::Pipeline;
use pipegraph::interaction::InteractionController;
use pipegraph::version::{
    FileSnapshotStore, InMemorySnapshotStore, VersionError, VersionNavigator,
};

fn snapshots() -> InMemorySnapshotStore {
    let mut store = InMemorySnapshotStore::new();

    let mut v1 = pipeline(vec![step("a", "m1")]);
    v1.version = 1;
    v1.is_latest = false;
    store.insert(v1);

    let mut v2 = pipeline(vec![branch("a", "m1", vec![step("b", "m2")])]);
    v2.version = 2;
    v2.is_latest = true;
    store.insert(v2);

    store
}

#[test]
fn test_enumeration_after_latest_fetch() {
    let mut nav = VersionNavigator::new(snapshots(), "test-pipeline");
    assert!(nav.versions().is_empty());

    let latest = nav.load_latest().unwrap();
    assert_eq!(latest.version, 2);
    assert_eq!(nav.versions(), vec![1, 2]);
}

#[test]
fn test_switching_replaces_tree_wholesale() {
    let mut nav = VersionNavigator::new(snapshots(), "test-pipeline");
    nav.load_latest().unwrap();
    assert_eq!(nav.current().unwrap().step_count(), 2);

    nav.select(1).unwrap();
    assert_eq!(nav.current().unwrap().step_count(), 1);
    assert!(nav.read_only());

    nav.select(2).unwrap();
    assert!(!nav.read_only());
}

#[test]
fn test_out_of_range_selection() {
    let mut nav = VersionNavigator::new(snapshots(), "test-pipeline");
    nav.load_latest().unwrap();
    assert!(matches!(
        nav.select(3),
        Err(VersionError::OutOfRange {
            requested: 3,
            latest: 2
        })
    ));
}

#[test]
fn test_navigator_feeds_read_only_session() {
    let mut nav = VersionNavigator::new(snapshots(), "test-pipeline");
    nav.load_latest().unwrap();
    nav.select(1).unwrap();

    let controller = InteractionController::new(nav.current().unwrap().clone(), false);
    // non-latest snapshots can never be edited, whatever the host asked for
    assert!(controller.read_only());
}

#[test]
fn test_file_store_navigation() {
    let dir = std::env::temp_dir().join(format!("pipegraph-nav-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();

    for (version, is_latest) in [(1u32, false), (2, true)] {
        let mut p: Pipeline = pipeline(vec![step("a", "m1")]);
        p.version = version;
        p.is_latest = is_latest;
        std::fs::write(
            dir.join(format!("test-pipeline.v{}.json", version)),
            p.to_json_pretty().unwrap(),
        )
        .unwrap();
    }

    let mut nav = VersionNavigator::new(FileSnapshotStore::new(&dir), "test-pipeline");
    nav.load_latest().unwrap();
    assert_eq!(nav.versions(), vec![1, 2]);
    assert_eq!(nav.select(1).unwrap().version, 1);

    std::fs::remove_dir_all(&dir).unwrap();
}
