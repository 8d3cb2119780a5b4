use std::fs;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use pagecatch_engine::{DirSnapshotStore, SnapshotStore};
use tempfile::TempDir;

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

/// Clock that advances by `step_secs` on every call.
fn stepping_store(dir: &TempDir, step_secs: i64) -> DirSnapshotStore {
    let calls = Arc::new(AtomicI64::new(0));
    DirSnapshotStore::with_clock(
        dir.path().to_path_buf(),
        Arc::new(move || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            base_time() + TimeDelta::seconds(n * step_secs)
        }),
    )
}

#[test]
fn save_names_file_by_timestamp_and_sanitized_identity() {
    let temp = TempDir::new().unwrap();
    let store = stepping_store(&temp, 1);

    let path = store.save("https://a.example/x#main", "<p>A</p>").unwrap();
    assert_eq!(
        path.file_name().unwrap(),
        "20240301-090000_https___a.example_x_main.txt"
    );
    assert_eq!(fs::read_to_string(&path).unwrap(), "<p>A</p>");
}

#[test]
fn fewer_than_two_snapshots_gives_none() {
    let temp = TempDir::new().unwrap();
    let store = stepping_store(&temp, 1);

    assert!(store.find_latest_two("site").unwrap().is_none());
    store.save("site", "one").unwrap();
    assert!(store.find_latest_two("site").unwrap().is_none());
}

#[test]
fn missing_directory_gives_none() {
    let temp = TempDir::new().unwrap();
    let store = DirSnapshotStore::new(temp.path().join("never_created"));
    assert!(store.find_latest_two("site").unwrap().is_none());
}

#[test]
fn latest_two_are_ordered_by_timestamp_not_listing() {
    let temp = TempDir::new().unwrap();
    // Written out of order on purpose.
    for (name, body) in [
        ("20240301-090002_site.txt", "third"),
        ("20240301-090000_site.txt", "first"),
        ("20240301-090003_site.txt", "fourth"),
        ("20240301-090001_site.txt", "second"),
        ("20240301-090009_other.txt", "other"),
    ] {
        fs::write(temp.path().join(name), body).unwrap();
    }
    let store = DirSnapshotStore::new(temp.path().to_path_buf());

    let (newest, previous) = store.find_latest_two("site").unwrap().unwrap();
    assert_eq!(fs::read_to_string(newest).unwrap(), "fourth");
    assert_eq!(fs::read_to_string(previous).unwrap(), "third");
}

#[test]
fn same_second_saves_add_entries() {
    let temp = TempDir::new().unwrap();
    let store = stepping_store(&temp, 0);

    let first = store.save("site", "v1").unwrap();
    let second = store.save("site", "v2").unwrap();
    let third = store.save("site", "v3").unwrap();
    assert_ne!(first, second);
    assert_eq!(second.file_name().unwrap(), "20240301-090000-01_site.txt");
    assert_eq!(third.file_name().unwrap(), "20240301-090000-02_site.txt");

    let (newest, previous) = store.find_latest_two("site").unwrap().unwrap();
    assert_eq!(fs::read_to_string(newest).unwrap(), "v3");
    assert_eq!(fs::read_to_string(previous).unwrap(), "v2");
}

#[test]
fn save_creates_missing_directory() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("data");
    let store = DirSnapshotStore::new(dir.clone());
    store.save("site", "x").unwrap();
    assert!(dir.is_dir());
}

#[test]
fn sequence_past_ninety_nine_is_still_newest() {
    let temp = TempDir::new().unwrap();
    let store = stepping_store(&temp, 0);
    for name in [
        "20240301-090000-99_site.txt",
        "20240301-090000-100_site.txt",
        "20240301-090000-98_site.txt",
    ] {
        fs::write(temp.path().join(name), name).unwrap();
    }

    let (newest, previous) = store.find_latest_two("site").unwrap().unwrap();
    assert_eq!(newest.file_name().unwrap(), "20240301-090000-100_site.txt");
    assert_eq!(previous.file_name().unwrap(), "20240301-090000-99_site.txt");
}
