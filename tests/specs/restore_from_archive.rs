// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario: a killed session is archived, then restored -- its PR survives
//! the round trip and it comes back in `spawning` with a fresh runtime
//! handle.

use ao_adapters::SpawnRequest;
use ao_core::SessionStatus;

use crate::prelude::*;

#[tokio::test]
async fn a_killed_session_restores_from_the_archive_with_its_pr_intact() {
    let fx = harness("demo", true, false, base_config());
    fx.workspace.set_restorable(true);
    let session = fx.session_manager.spawn(&fx.project.id, SpawnRequest::default()).await.unwrap();

    fx.session_manager
        .metadata_store()
        .update(
            &session.id,
            &[
                ("status".to_string(), "killed".to_string()),
                ("pr".to_string(), serde_json::to_string(&pr(9)).unwrap()),
            ]
            .into_iter()
            .collect(),
        )
        .unwrap();

    fx.session_manager.kill(&session.id).await.unwrap();
    assert!(fx.session_manager.get(&session.id).await.unwrap().is_none(), "archived sessions aren't in the active set");

    let restored = fx.session_manager.restore(&session.id).await.unwrap();
    assert_eq!(restored.status, SessionStatus::Spawning);
    assert!(restored.restored_at.is_some());
    assert_eq!(restored.pr.as_ref().map(|pr| pr.number), Some(9));
}
