// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario: two reviewer agents approve a PR, crossing the K-of-N reviewer
//! gate; once CI, the reviewer gate, and a pre-recorded verifier pass all
//! line up, the session becomes `mergeable`.
//!
//! `reviewer_passed` is a one-time milestone event, not a status a session
//! sits in (see the gate's own short-circuit), so the "becomes
//! reviewer_passed" half of the scenario is observed through the
//! `reviewerPassed` metadata flag it sets rather than through
//! `SessionStatus` directly.

use ao_adapters::{CiSummary, Mergeability, ReviewComment, ReviewDecision, SpawnRequest};
use ao_core::SessionStatus;

use crate::prelude::*;

#[tokio::test]
async fn k_of_n_reviewer_approval_leads_to_mergeable() {
    let fx = harness("demo", true, false, base_config());
    let session = fx.session_manager.spawn(&fx.project.id, SpawnRequest::default()).await.unwrap();
    fx.scm.set_detected_pr(session.id.as_str(), pr(55));

    fx.lifecycle.tick().await;
    let pending = fx.session_manager.get(&session.id).await.unwrap().unwrap();
    assert_eq!(pending.status, SessionStatus::ReviewerPending);
    assert_eq!(fx.session_manager.list(None).await.unwrap().len(), 3, "two reviewer sessions spawned alongside the worker");

    fx.scm.set_issue_comments(
        55,
        vec![
            ReviewComment {
                author: "r1".to_string(),
                body: "AO_REVIEWER_ID=r1 AO_REVIEWER_VERDICT=APPROVE AO_REVIEWER_CYCLE=1 AO_REVIEWER_EVIDENCE=true".to_string(),
                resolved: true,
            },
            ReviewComment {
                author: "r2".to_string(),
                body: "AO_REVIEWER_ID=r2 AO_REVIEWER_VERDICT=APPROVE AO_REVIEWER_CYCLE=1 AO_REVIEWER_EVIDENCE=true".to_string(),
                resolved: true,
            },
        ],
    );

    fx.lifecycle.tick().await;
    let passed = fx.session_manager.get(&session.id).await.unwrap().unwrap();
    assert_eq!(passed.metadata.get("reviewerPassed").map(String::as_str), Some("true"));

    fx.session_manager
        .metadata_store()
        .update(&session.id, &[("verifierPassed".to_string(), "true".to_string())].into_iter().collect())
        .unwrap();
    fx.scm.set_review_decision(55, ReviewDecision::Approved);
    fx.scm.set_mergeability(55, Mergeability { mergeable: true, has_conflicts: false });
    fx.scm.set_ci_summary(55, CiSummary::Passing);

    fx.lifecycle.tick().await;
    let merge_ready = fx.session_manager.get(&session.id).await.unwrap().unwrap();
    assert_eq!(merge_ready.status, SessionStatus::Mergeable);
}
