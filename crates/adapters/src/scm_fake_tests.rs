// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ao_core::test_support::SessionBuilder;
use ao_core::PrRecord;

fn pr(number: u64) -> PrRecord {
    PrRecord {
        number,
        url: format!("https://example.com/pr/{number}"),
        owner: "acme".into(),
        repo: "my-app".into(),
        head: "feat/x".into(),
        base: "main".into(),
        draft: false,
    }
}

#[tokio::test]
async fn detect_pr_returns_none_when_unscripted() {
    let scm = FakeScmPlugin::new("fake");
    let session = SessionBuilder::new("app-1", "my-app").build();
    let project = Project {
        id: ProjectId::new("my-app"),
        root: "/repo".into(),
        default_branch: "main".into(),
        has_tracker: false,
        has_scm: true,
    };
    assert!(scm.detect_pr(&session, &project).await.unwrap().is_none());
}

#[tokio::test]
async fn pr_state_defaults_to_open() {
    let scm = FakeScmPlugin::new("fake");
    assert_eq!(scm.get_pr_state(&pr(1)).await.unwrap(), PrState::Open);
    scm.set_pr_state(1, PrState::Merged);
    assert_eq!(scm.get_pr_state(&pr(1)).await.unwrap(), PrState::Merged);
}

#[tokio::test]
async fn merge_pr_is_recorded() {
    let scm = FakeScmPlugin::new("fake");
    scm.merge_pr(&pr(5)).await.unwrap();
    assert!(scm.is_merged(5));
    assert!(!scm.is_merged(6));
}

#[tokio::test]
async fn post_comment_accumulates() {
    let scm = FakeScmPlugin::new("fake");
    scm.post_comment(&pr(1), "AO_REVIEWER_VERDICT:APPROVE").await.unwrap();
    scm.post_comment(&pr(1), "AO_REVIEWER_VERDICT:REJECT").await.unwrap();
    assert_eq!(scm.posted_comments(1).len(), 2);
}
