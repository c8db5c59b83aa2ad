// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario: complete evidence spawns a verifier session; once the verifier
//! records a passing verdict, the worker advances to `pr_ready`.

use ao_adapters::SpawnRequest;
use ao_core::{SessionId, SessionStatus};

use crate::prelude::*;

#[tokio::test]
async fn verifier_passes_evidence_through_to_pr_ready() {
    let fx = harness("demo", false, false, base_config());
    let session = fx.session_manager.spawn(&fx.project.id, SpawnRequest::default()).await.unwrap();

    let evidence_root = tempfile::tempdir().unwrap();
    give_complete_evidence(&fx, &session.id, evidence_root.path());

    fx.lifecycle.tick().await;

    let pending = fx.session_manager.get(&session.id).await.unwrap().unwrap();
    assert_eq!(pending.status, SessionStatus::VerifierPending);
    let verifier_id = SessionId::new(pending.metadata.get("verifierSessionId").unwrap().clone());
    let verifier = fx.session_manager.get(&verifier_id).await.unwrap().unwrap();
    assert_eq!(verifier.role(), Some("verifier"));

    fx.session_manager
        .metadata_store()
        .update(
            &verifier_id,
            &[("verifierVerdict".to_string(), "passed".to_string())].into_iter().collect(),
        )
        .unwrap();

    fx.lifecycle.tick().await;

    let ready = fx.session_manager.get(&session.id).await.unwrap().unwrap();
    assert_eq!(ready.status, SessionStatus::PrReady);
}
