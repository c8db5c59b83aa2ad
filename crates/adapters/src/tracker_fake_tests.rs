// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ao_core::ProjectId;

fn project() -> Project {
    Project {
        id: ProjectId::new("my-app"),
        root: "/repo".into(),
        default_branch: "main".into(),
        has_tracker: true,
        has_scm: false,
    }
}

#[tokio::test]
async fn get_issue_returns_not_found_when_unscripted() {
    let tracker = FakeTrackerPlugin::new("fake");
    let err = tracker.get_issue("ISSUE-1", &project()).await.unwrap_err();
    assert!(matches!(err, TrackerError::IssueNotFound(id) if id == "ISSUE-1"));
}

#[tokio::test]
async fn get_issue_returns_scripted_issue() {
    let tracker = FakeTrackerPlugin::new("fake");
    tracker.add_issue(Issue {
        id: "ISSUE-1".into(),
        title: "Fix the thing".into(),
        completed: false,
    });
    let issue = tracker.get_issue("ISSUE-1", &project()).await.unwrap();
    assert_eq!(issue.title, "Fix the thing");
    assert!(!tracker.is_completed(&issue));
}

#[tokio::test]
async fn auth_failure_can_be_scripted() {
    let tracker = FakeTrackerPlugin::new("fake");
    tracker.set_auth_fails(true);
    let err = tracker.get_issue("ISSUE-1", &project()).await.unwrap_err();
    assert!(matches!(err, TrackerError::AuthFailure(_)));
}

#[test]
fn branch_name_and_acceptance_contract_default_to_none() {
    let tracker = FakeTrackerPlugin::new("fake");
    assert!(tracker.branch_name("ISSUE-1", &project()).is_none());

    tracker.set_branch_name("ISSUE-1", "feat/issue-1");
    assert_eq!(tracker.branch_name("ISSUE-1", &project()).as_deref(), Some("feat/issue-1"));

    let issue = Issue {
        id: "ISSUE-1".into(),
        title: "t".into(),
        completed: false,
    };
    assert!(tracker.acceptance_contract(&issue, &project()).is_none());
    tracker.set_acceptance_contract("ISSUE-1", "must pass CI");
    assert_eq!(
        tracker.acceptance_contract(&issue, &project()).as_deref(),
        Some("must pass CI")
    );
}
