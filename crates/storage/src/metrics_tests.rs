// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn records_append_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let metrics = OutcomeMetrics::new(dir.path().join("transitions.jsonl"));
    let id = SessionId::new("app-1");
    metrics.record_transition(&id, "working", "ci_failed", DateTime::UNIX_EPOCH).unwrap();
    metrics.record_transition(&id, "ci_failed", "merged", DateTime::UNIX_EPOCH).unwrap();
    let all = metrics.read_all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].to, "ci_failed");
    assert_eq!(all[1].to, "merged");
}

#[test]
fn read_all_on_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let metrics = OutcomeMetrics::new(dir.path().join("nope.jsonl"));
    assert!(metrics.read_all().unwrap().is_empty());
}

#[test]
fn never_rewrites_prior_entries() {
    let dir = tempfile::tempdir().unwrap();
    let metrics = OutcomeMetrics::new(dir.path().join("transitions.jsonl"));
    let id = SessionId::new("app-1");
    for i in 0..5 {
        metrics
            .record_transition(&id, "working", &format!("state-{i}"), DateTime::UNIX_EPOCH)
            .unwrap();
    }
    assert_eq!(metrics.read_all().unwrap().len(), 5);
}
