// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario: a `send-to-agent` reaction that keeps failing climbs the
//! escalation ladder worker -> verifier -> orchestrator -> human, and a
//! human notification fires exactly once it tops out.

use ao_adapters::{CiSummary, SpawnRequest};
use ao_core::{Priority, SessionStatus};

use crate::prelude::*;

#[tokio::test]
async fn repeated_send_failures_climb_the_ladder_to_a_human_notification() {
    let mut config = base_config();
    config.reactions.insert("ci-failed".to_string(), ao_engine::ReactionConfig::send_to_agent("CI is red."));
    config.notification_routing.insert(Priority::Urgent, vec!["fake-notifier".to_string()]);

    let fx = harness("demo", true, false, config);
    let session = fx.session_manager.spawn(&fx.project.id, SpawnRequest::default()).await.unwrap();
    let handle_id = session.runtime_handle.as_ref().unwrap().id.clone();

    fx.scm.set_detected_pr(session.id.as_str(), pr(7));
    fx.scm.set_ci_summary(7, CiSummary::Failing);

    // worker (3 retries) + verifier (2 retries) + orchestrator (1 retry) all
    // exhausted needs 4 + 3 + 2 = 9 failed sends to land on `human`.
    fx.runtime.fail_sends(&handle_id, 9);

    for _ in 0..9 {
        fx.lifecycle.tick().await;
    }

    let session = fx.session_manager.get(&session.id).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::CiFailed);
    assert_eq!(fx.runtime.send_count(&handle_id), 9);
    assert_eq!(fx.notifier.sent_count(), 1);
    assert_eq!(fx.notifier.sent()[0].event_type, ao_core::EventType::ReactionEscalated);

    // the ladder caps at `human`: further ticks must not attempt another send.
    fx.lifecycle.tick().await;
    assert_eq!(fx.runtime.send_count(&handle_id), 9);
    assert_eq!(fx.notifier.sent_count(), 1);
}
