// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::{LevelCounts, LevelThresholdsMs};
use ao_core::escalation::EscalationLevel;
use chrono::Duration;

fn policy(worker_retries: u32) -> EscalationPolicy {
    EscalationPolicy {
        retry_counts: LevelCounts {
            worker: worker_retries,
            verifier: 2,
            orchestrator: 1,
        },
        time_thresholds_ms: LevelThresholdsMs::default(),
    }
}

#[test]
fn successful_send_clears_the_tracker() {
    let mut states = EscalationStateMap::new();
    let now = Utc::now();
    let policy = policy(3);

    let tick = begin_tick(&mut states, "ci-failed", now, &policy);
    assert!(tick.should_send);
    assert_eq!(tick.level, EscalationLevel::Worker);

    assert!(record_result(&mut states, "ci-failed", now, &policy, true).is_none());
    assert!(!states.contains_key("ci-failed"));
}

#[test]
fn failures_accumulate_without_promoting_under_threshold() {
    let mut states = EscalationStateMap::new();
    let now = Utc::now();
    let policy = policy(2);

    begin_tick(&mut states, "ci-failed", now, &policy);
    assert!(record_result(&mut states, "ci-failed", now, &policy, false).is_none());
    begin_tick(&mut states, "ci-failed", now, &policy);
    assert!(record_result(&mut states, "ci-failed", now, &policy, false).is_none());

    let state = &states["ci-failed"];
    assert_eq!(state.level, EscalationLevel::Worker);
    assert_eq!(state.attempts_in_level, 2);
}

#[test]
fn promotes_once_attempts_exceed_retry_threshold() {
    let mut states = EscalationStateMap::new();
    let now = Utc::now();
    let policy = policy(2);

    for _ in 0..2 {
        begin_tick(&mut states, "ci-failed", now, &policy);
        assert!(record_result(&mut states, "ci-failed", now, &policy, false).is_none());
    }
    begin_tick(&mut states, "ci-failed", now, &policy);
    let transition =
        record_result(&mut states, "ci-failed", now, &policy, false).expect("third failure promotes");
    assert_eq!(transition.from, EscalationLevel::Worker);
    assert_eq!(transition.to, EscalationLevel::Verifier);

    let state = &states["ci-failed"];
    assert_eq!(state.level, EscalationLevel::Verifier);
    assert_eq!(state.attempts_in_level, 0);
}

#[test]
fn promotes_by_time_before_any_send_is_attempted() {
    let mut states = EscalationStateMap::new();
    let t0 = Utc::now();
    let mut policy = policy(10);
    policy.time_thresholds_ms.worker = Some(1_000);

    begin_tick(&mut states, "stuck", t0, &policy);
    record_result(&mut states, "stuck", t0, &policy, false);

    let later = t0 + Duration::milliseconds(1_500);
    let tick = begin_tick(&mut states, "stuck", later, &policy);
    let transition = tick.time_promotion.expect("time threshold promotes before send");
    assert_eq!(transition.reason, ao_core::escalation::PromotionReason::TimeThreshold);
    assert_eq!(tick.level, EscalationLevel::Verifier);
    assert!(tick.should_send);
}

#[test]
fn human_level_suppresses_further_sends() {
    let mut states = EscalationStateMap::new();
    let now = Utc::now();
    let policy = EscalationPolicy {
        retry_counts: LevelCounts {
            worker: 0,
            verifier: 0,
            orchestrator: 0,
        },
        time_thresholds_ms: LevelThresholdsMs::default(),
    };

    for _ in 0..3 {
        let tick = begin_tick(&mut states, "stuck", now, &policy);
        if tick.should_send {
            record_result(&mut states, "stuck", now, &policy, false);
        }
    }
    assert_eq!(states["stuck"].level, EscalationLevel::Human);

    let tick = begin_tick(&mut states, "stuck", now, &policy);
    assert!(!tick.should_send);
    assert_eq!(tick.level, EscalationLevel::Human);
}
