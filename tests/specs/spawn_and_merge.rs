// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario: spawn a session against an issue tracker, then watch a single
//! poll carry it all the way to `merged` once the SCM reports the PR merged.

use ao_adapters::{PrState, SpawnRequest};
use ao_core::SessionStatus;

use crate::prelude::*;

#[tokio::test]
async fn spawn_resolves_tracker_branch_and_first_poll_detects_the_merge() {
    let fx = harness("app", /* has_scm */ true, /* has_tracker */ true, base_config());
    fx.tracker.set_branch_name("INT-100", "feat/INT-100");

    let session = fx
        .session_manager
        .spawn(
            &fx.project.id,
            SpawnRequest {
                issue_id: Some("INT-100".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(session.id.as_str(), "app-1");
    assert_eq!(session.branch.as_deref(), Some("feat/INT-100"));
    assert_eq!(session.status, SessionStatus::Spawning);
    assert!(fx.session_manager.metadata_store().sessions_dir().join("app-1").exists());

    fx.scm.set_detected_pr(session.id.as_str(), pr(100));
    fx.scm.set_pr_state(100, PrState::Merged);

    fx.lifecycle.tick().await;

    let polled = fx.session_manager.get(&session.id).await.unwrap().unwrap();
    assert_eq!(polled.status, SessionStatus::Merged);
}
