// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::TimeZone;
use pk_core::Readings;
use serde_json::json;

fn chemical_test_payload() -> serde_json::Value {
    let readings = Readings::parse_pairs(["ph=7.4", "fc=2.5"]).unwrap();
    let tested_at = Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap();
    ChemicalTest::new("main", tested_at, readings)
        .unwrap()
        .to_payload()
        .unwrap()
}

fn open(dir: &Path) -> ServerState {
    ServerState::new(dir, HashSet::new()).unwrap()
}

#[tokio::test]
async fn applies_new_write() {
    let temp = tempfile::tempdir().unwrap();
    let state = open(temp.path());

    let outcome = state
        .apply_write("q-1", "maintenance_log", json!({"task": "backwash"}))
        .await
        .unwrap();

    assert_eq!(outcome, WriteOutcome::Applied);
    let writes = state.applied_writes().await.unwrap();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].id, "q-1");
    assert_eq!(writes[0].payload["task"], "backwash");
}

#[tokio::test]
async fn second_delivery_is_duplicate() {
    let temp = tempfile::tempdir().unwrap();
    let state = open(temp.path());

    state.apply_write("q-1", "maintenance_log", json!({})).await.unwrap();
    let outcome = state
        .apply_write("q-1", "maintenance_log", json!({"changed": true}))
        .await
        .unwrap();

    assert_eq!(outcome, WriteOutcome::Duplicate);
    assert_eq!(state.applied_count().await, 1);
    let writes = state.applied_writes().await.unwrap();
    assert_eq!(writes[0].payload, json!({}));
}

#[tokio::test]
async fn applied_ids_survive_restart() {
    let temp = tempfile::tempdir().unwrap();
    open(temp.path())
        .apply_write("q-1", "maintenance_log", json!({}))
        .await
        .unwrap();

    let reopened = open(temp.path());
    assert_eq!(reopened.applied_count().await, 1);
    let outcome = reopened
        .apply_write("q-1", "maintenance_log", json!({}))
        .await
        .unwrap();
    assert_eq!(outcome, WriteOutcome::Duplicate);
}

#[tokio::test]
async fn creates_missing_data_dir() {
    let temp = tempfile::tempdir().unwrap();
    let dir = temp.path().join("nested/data");

    let state = open(&dir);
    state.apply_write("q-1", "maintenance_log", json!({})).await.unwrap();

    assert!(dir.join("applied.jsonl").exists());
}

#[tokio::test]
async fn rejects_configured_type() {
    let temp = tempfile::tempdir().unwrap();
    let reject: HashSet<String> = ["maintenance_log".to_string()].into_iter().collect();
    let state = ServerState::new(temp.path(), reject).unwrap();

    let outcome = state
        .apply_write("q-1", "maintenance_log", json!({}))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        WriteOutcome::Rejected("record type 'maintenance_log' not accepted".to_string())
    );
    assert_eq!(state.applied_count().await, 0);
}

#[tokio::test]
async fn rejected_write_can_be_applied_later() {
    let temp = tempfile::tempdir().unwrap();
    let state = open(temp.path());

    let first = state.apply_write("q-1", "", json!({})).await.unwrap();
    assert_eq!(first, WriteOutcome::Rejected("missing record type".to_string()));

    let second = state
        .apply_write("q-1", "maintenance_log", json!({}))
        .await
        .unwrap();
    assert_eq!(second, WriteOutcome::Applied);
}

#[tokio::test]
async fn rejects_blank_id() {
    let temp = tempfile::tempdir().unwrap();
    let state = open(temp.path());

    let outcome = state.apply_write(" ", "maintenance_log", json!({})).await.unwrap();
    assert_eq!(outcome, WriteOutcome::Rejected("missing id".to_string()));
}

#[tokio::test]
async fn validates_chemical_test_payload() {
    let temp = tempfile::tempdir().unwrap();
    let state = open(temp.path());

    let good = state
        .apply_write("q-1", CHEMICAL_TEST_TYPE, chemical_test_payload())
        .await
        .unwrap();
    assert_eq!(good, WriteOutcome::Applied);

    let bad = state
        .apply_write("q-2", CHEMICAL_TEST_TYPE, json!({"ph": 7.4}))
        .await
        .unwrap();
    assert!(
        matches!(&bad, WriteOutcome::Rejected(reason) if reason.starts_with("invalid chemical_test:")),
        "{:?}",
        bad
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_deliveries_of_one_id_apply_once() {
    let temp = tempfile::tempdir().unwrap();
    let state = open(temp.path());

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let state = state.clone();
            tokio::spawn(async move {
                state
                    .apply_write("q-1", "maintenance_log", json!({"attempt": i}))
                    .await
                    .unwrap()
            })
        })
        .collect();
    let mut outcomes = Vec::new();
    for task in tasks {
        outcomes.push(task.await.unwrap());
    }

    let applied = outcomes
        .iter()
        .filter(|o| **o == WriteOutcome::Applied)
        .count();
    assert_eq!(applied, 1);
    assert_eq!(outcomes.len() - applied, 15);
    assert!(outcomes
        .iter()
        .all(|o| matches!(o, WriteOutcome::Applied | WriteOutcome::Duplicate)));

    let content = std::fs::read_to_string(temp.path().join("applied.jsonl")).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert_eq!(state.applied_count().await, 1);
}

