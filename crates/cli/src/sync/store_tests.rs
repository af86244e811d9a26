// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::store::{JsonlStore, MemoryStore, QueueStore};
use super::test_helpers::make_item;
use tempfile::tempdir;

fn ids(items: &[pk_core::QueueItem]) -> Vec<&str> {
    items.iter().map(|i| i.id.as_str()).collect()
}

/// Behaviour both stores must share.
fn exercise_store(store: &dyn QueueStore) {
    store.append(&make_item("q-1", 0)).unwrap();
    store.append(&make_item("q-2", 1)).unwrap();
    store.append(&make_item("q-3", 2)).unwrap();
    assert_eq!(ids(&store.list().unwrap()), vec!["q-1", "q-2", "q-3"]);

    let mut failed = make_item("q-2", 1);
    failed.record_failure("timeout");
    assert!(store.update(&failed).unwrap());
    let listed = store.list().unwrap();
    assert_eq!(listed[1].attempts, 1);
    assert_eq!(listed[1].last_error.as_deref(), Some("timeout"));

    assert!(store.remove("q-1").unwrap());
    assert!(!store.remove("q-1").unwrap());
    assert_eq!(ids(&store.list().unwrap()), vec!["q-2", "q-3"]);

    store.dead_letter(&failed).unwrap();
    assert_eq!(ids(&store.list().unwrap()), vec!["q-3"]);
    assert_eq!(ids(&store.dead_letters().unwrap()), vec!["q-2"]);

    assert_eq!(store.clear().unwrap(), 1);
    assert!(store.list().unwrap().is_empty());
    // Dead letters survive a queue clear.
    assert_eq!(store.dead_letters().unwrap().len(), 1);

    assert_eq!(store.clear_dead_letters().unwrap(), 1);
    assert!(store.dead_letters().unwrap().is_empty());
}

/// Conditional append and dead-letter requeue both stores must share.
fn exercise_conditional_writes(store: &dyn QueueStore) {
    assert!(store.append_if_absent(&make_item("q-1", 0)).unwrap());
    assert!(!store.append_if_absent(&make_item("q-1", 5)).unwrap());

    let mut dead = make_item("q-2", 1);
    store.append(&dead).unwrap();
    dead.record_failure("rejected");
    store.dead_letter(&dead).unwrap();
    // A dead-lettered id is still taken.
    assert!(!store.append_if_absent(&make_item("q-2", 6)).unwrap());
    assert_eq!(ids(&store.list().unwrap()), vec!["q-1"]);

    assert_eq!(store.requeue_dead_letters().unwrap(), 1);
    let listed = store.list().unwrap();
    assert_eq!(ids(&listed), vec!["q-1", "q-2"]);
    assert_eq!(listed[1].attempts, 0);
    assert!(store.dead_letters().unwrap().is_empty());
    assert_eq!(store.requeue_dead_letters().unwrap(), 0);
}

#[test]
fn memory_store_contract() {
    exercise_store(&MemoryStore::new());
    exercise_conditional_writes(&MemoryStore::new());
}

#[test]
fn jsonl_store_contract() {
    let dir = tempdir().unwrap();
    let store = JsonlStore::open(dir.path()).unwrap();
    exercise_store(&store);

    let dir = tempdir().unwrap();
    let store = JsonlStore::open(dir.path()).unwrap();
    exercise_conditional_writes(&store);
}

#[test]
fn requeue_skips_ids_already_pending() {
    let store = MemoryStore::new();
    let item = make_item("q-1", 0);
    store.append(&item).unwrap();
    store.dead_letter(&item).unwrap();
    store.append(&item).unwrap();

    assert_eq!(store.requeue_dead_letters().unwrap(), 0);
    assert_eq!(ids(&store.list().unwrap()), vec!["q-1"]);
    assert!(store.dead_letters().unwrap().is_empty());
}

#[test]
fn update_of_absent_item_does_not_resurrect_it() {
    let store = MemoryStore::new();
    let mut item = make_item("q-1", 0);
    store.append(&item).unwrap();
    store.clear().unwrap();

    item.record_failure("late failure");
    assert!(!store.update(&item).unwrap());
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn jsonl_store_survives_reopen() {
    let dir = tempdir().unwrap();
    {
        let store = JsonlStore::open(dir.path()).unwrap();
        store.append(&make_item("q-1", 0)).unwrap();
        store.append(&make_item("q-2", 1)).unwrap();
        store.remove("q-1").unwrap();
    }

    let store = JsonlStore::open(dir.path()).unwrap();
    assert_eq!(ids(&store.list().unwrap()), vec!["q-2"]);
}

#[test]
fn jsonl_store_open_creates_directory_and_files() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("a").join("queue");
    let store = JsonlStore::open(&nested).unwrap();
    assert_eq!(store.dir(), nested.as_path());
    assert!(nested.join("queue.jsonl").exists());
    assert!(store.list().unwrap().is_empty());
    assert!(store.dead_letters().unwrap().is_empty());
}

#[test]
fn jsonl_store_persists_one_line_per_item() {
    let dir = tempdir().unwrap();
    let store = JsonlStore::open(dir.path()).unwrap();
    store.append(&make_item("q-1", 0)).unwrap();
    store.append(&make_item("q-2", 1)).unwrap();

    let content = std::fs::read_to_string(dir.path().join("queue.jsonl")).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["id"], "q-1");
    assert_eq!(first["type"], "chemical_test");
}

#[test]
fn two_handles_on_one_directory_see_each_other() {
    let dir = tempdir().unwrap();
    let a = JsonlStore::open(dir.path()).unwrap();
    let b = JsonlStore::open(dir.path()).unwrap();

    a.append(&make_item("q-1", 0)).unwrap();
    b.append(&make_item("q-2", 1)).unwrap();
    assert!(a.remove("q-2").unwrap());
    assert_eq!(ids(&b.list().unwrap()), vec!["q-1"]);
}

#[test]
fn concurrent_appends_are_not_lost() {
    let dir = tempdir().unwrap();
    let path = dir.path().to_path_buf();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let path = path.clone();
            std::thread::spawn(move || {
                let store = JsonlStore::open(&path).unwrap();
                for i in 0..10 {
                    store
                        .append(&make_item(&format!("q-{}-{}", t, i), i))
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let store = JsonlStore::open(&path).unwrap();
    assert_eq!(store.list().unwrap().len(), 40);
}

#[test]
fn concurrent_conditional_appends_of_one_id_keep_one_item() {
    let dir = tempdir().unwrap();
    let path = dir.path().to_path_buf();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let path = path.clone();
            std::thread::spawn(move || {
                let store = JsonlStore::open(&path).unwrap();
                (0..10)
                    .filter(|i| store.append_if_absent(&make_item("q-1", t * 10 + i)).unwrap())
                    .count()
            })
        })
        .collect();
    let written: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    assert_eq!(written, 1);
    let store = JsonlStore::open(&path).unwrap();
    assert_eq!(ids(&store.list().unwrap()), vec!["q-1"]);
}

#[test]
fn drain_lease_is_exclusive_across_handles() {
    let dir = tempdir().unwrap();
    let a = JsonlStore::open(dir.path()).unwrap();
    let b = JsonlStore::open(dir.path()).unwrap();

    let lease = a.begin_drain().unwrap();
    assert!(lease.is_some());
    assert!(b.begin_drain().unwrap().is_none());
    assert!(a.begin_drain().unwrap().is_none());

    drop(lease);
    assert!(b.begin_drain().unwrap().is_some());
}

#[test]
fn memory_store_always_grants_a_drain_lease() {
    let store = MemoryStore::new();
    let _held = store.begin_drain().unwrap();
    assert!(store.begin_drain().unwrap().is_some());
}

#[test]
fn torn_trailing_line_does_not_block_the_queue() {
    use std::io::Write;

    let dir = tempdir().unwrap();
    let store = JsonlStore::open(dir.path()).unwrap();
    store.append(&make_item("q-1", 0)).unwrap();
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(dir.path().join("queue.jsonl"))
        .unwrap();
    file.write_all(br#"{"id":"q-2","ty"#).unwrap();

    assert_eq!(ids(&store.list().unwrap()), vec!["q-1"]);
    store.append(&make_item("q-3", 2)).unwrap();
    assert_eq!(ids(&store.list().unwrap()), vec!["q-1", "q-3"]);
    assert!(store.remove("q-1").unwrap());
    assert_eq!(ids(&store.list().unwrap()), vec!["q-3"]);
}
