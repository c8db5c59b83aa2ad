// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario: a failing CI run fires a `send-to-agent` reaction; the first
//! attempt fails, the retry on the next tick succeeds, and the escalation
//! ladder clears without ever promoting past `worker`.

use ao_adapters::{CiSummary, SpawnRequest};
use ao_core::SessionStatus;

use crate::prelude::*;

#[tokio::test]
async fn a_failed_send_retries_on_the_next_tick_and_then_clears() {
    let mut config = base_config();
    config.reactions.insert("ci-failed".to_string(), ao_engine::ReactionConfig::send_to_agent("CI is red, please investigate."));

    let fx = harness("demo", true, false, config);
    let session = fx.session_manager.spawn(&fx.project.id, SpawnRequest::default()).await.unwrap();
    let handle_id = session.runtime_handle.as_ref().unwrap().id.clone();

    fx.scm.set_detected_pr(session.id.as_str(), pr(7));
    fx.scm.set_ci_summary(7, CiSummary::Failing);
    fx.runtime.fail_sends(&handle_id, 1);

    fx.lifecycle.tick().await;
    let after_first = fx.session_manager.get(&session.id).await.unwrap().unwrap();
    assert_eq!(after_first.status, SessionStatus::CiFailed);
    assert_eq!(fx.runtime.send_count(&handle_id), 1);
    assert!(after_first.metadata.get("escalationState").is_some());

    fx.lifecycle.tick().await;
    let after_retry = fx.session_manager.get(&session.id).await.unwrap().unwrap();
    assert_eq!(after_retry.status, SessionStatus::CiFailed);
    assert_eq!(fx.runtime.send_count(&handle_id), 2);
    assert!(
        after_retry.metadata.get("escalationState").is_none(),
        "a successful retry clears the ladder instead of leaving a stale entry"
    );
}
