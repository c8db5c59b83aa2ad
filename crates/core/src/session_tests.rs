// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::BTreeMap;

fn sample() -> Session {
    Session {
        id: SessionId::new("app-1"),
        project_id: ProjectId::new("my-app"),
        status: SessionStatus::Working,
        activity: None,
        branch: Some("feat/INT-100".into()),
        issue_id: Some("INT-100".into()),
        workspace_path: None,
        pr: None,
        runtime_handle: None,
        created_at: DateTime::UNIX_EPOCH,
        last_activity_at: None,
        restored_at: None,
        metadata: BTreeMap::new(),
    }
}

#[test]
fn terminal_set_is_merged_and_killed_only() {
    assert!(SessionStatus::Merged.is_terminal());
    assert!(SessionStatus::Killed.is_terminal());
    assert!(!SessionStatus::Done.is_terminal());
    assert!(!SessionStatus::Errored.is_terminal());
}

#[test]
fn restorable_set_matches_spec() {
    for s in [
        SessionStatus::Killed,
        SessionStatus::Errored,
        SessionStatus::Terminated,
    ] {
        assert!(s.is_restorable());
    }
    assert!(!SessionStatus::Working.is_restorable());
}

#[test]
fn status_round_trips_through_str() {
    for s in [
        SessionStatus::Spawning,
        SessionStatus::VerifierPending,
        SessionStatus::ReviewerPassed,
        SessionStatus::Mergeable,
        SessionStatus::Cleanup,
    ] {
        let parsed: SessionStatus = s.as_str().parse().unwrap();
        assert_eq!(parsed, s);
    }
}

#[test]
fn role_reads_from_metadata() {
    let mut s = sample();
    assert_eq!(s.role(), None);
    s.metadata.insert("role".into(), "verifier".into());
    assert!(s.is_verifier());
    assert!(!s.is_reviewer());
}

#[test]
fn bump_last_activity_is_monotonic() {
    let mut s = sample();
    let t1 = DateTime::UNIX_EPOCH + chrono::Duration::seconds(10);
    let t0 = DateTime::UNIX_EPOCH + chrono::Duration::seconds(5);
    s.bump_last_activity(t1);
    assert_eq!(s.last_activity_at, Some(t1));
    s.bump_last_activity(t0);
    assert_eq!(s.last_activity_at, Some(t1), "must never decrease");
}
