// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn starts_at_worker_level_with_zero_attempts() {
    let now = DateTime::UNIX_EPOCH;
    let state = ReactionEscalationState::new(now);
    assert_eq!(state.level, EscalationLevel::Worker);
    assert_eq!(state.attempts_in_level, 0);
    assert_eq!(state.total_attempts, 0);
    assert!(state.history.is_empty());
}

#[test]
fn promote_walks_the_fixed_ladder() {
    let mut state = ReactionEscalationState::new(DateTime::UNIX_EPOCH);
    let t1 = DateTime::UNIX_EPOCH + chrono::Duration::seconds(10);
    assert!(state.promote(t1, PromotionReason::RetryCount));
    assert_eq!(state.level, EscalationLevel::Verifier);
    assert!(state.promote(t1, PromotionReason::RetryCount));
    assert_eq!(state.level, EscalationLevel::Orchestrator);
    assert!(state.promote(t1, PromotionReason::TimeThreshold));
    assert_eq!(state.level, EscalationLevel::Human);
    assert_eq!(state.history.len(), 3);
}

#[test]
fn promote_is_noop_past_human() {
    let mut state = ReactionEscalationState::new(DateTime::UNIX_EPOCH);
    for _ in 0..3 {
        state.promote(DateTime::UNIX_EPOCH, PromotionReason::RetryCount);
    }
    assert_eq!(state.level, EscalationLevel::Human);
    assert!(!state.promote(DateTime::UNIX_EPOCH, PromotionReason::RetryCount));
    assert_eq!(state.history.len(), 3);
}

#[test]
fn promote_resets_attempts_in_level() {
    let mut state = ReactionEscalationState::new(DateTime::UNIX_EPOCH);
    state.attempts_in_level = 5;
    state.promote(DateTime::UNIX_EPOCH, PromotionReason::RetryCount);
    assert_eq!(state.attempts_in_level, 0);
}

#[test]
fn escalation_map_round_trips() {
    let mut map = EscalationStateMap::new();
    map.insert("ci-failed".into(), ReactionEscalationState::new(DateTime::UNIX_EPOCH));
    let encoded = serialize_escalation_map(&map).unwrap();
    let decoded = deserialize_escalation_map(&encoded).unwrap();
    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded["ci-failed"].level, EscalationLevel::Worker);
}

#[test]
fn empty_string_deserializes_to_empty_map() {
    let decoded = deserialize_escalation_map("").unwrap();
    assert!(decoded.is_empty());
}
