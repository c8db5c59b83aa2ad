// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Escalation ladder driver (spec.md §4.3.4).
//!
//! `ao_core::escalation` owns the state shape; this module owns walking it
//! forward each time a `send-to-agent` reaction fires again. The ladder is
//! driven in two steps because the actual `sessionManager.send` attempt
//! happens in the caller (the lifecycle manager), between them:
//!
//! 1. [`begin_tick`]: promote by time if the level has been held past its
//!    threshold, then report whether a send should even be attempted (never,
//!    at `human`).
//! 2. [`record_result`]: after the caller attempts the send, clear the
//!    tracker on success or promote by retry count on failure.

use crate::config::EscalationPolicy;
use ao_core::escalation::{EscalationLevel, EscalationStateMap, EscalationTransition, PromotionReason, ReactionEscalationState};
use chrono::{DateTime, Utc};

/// Outcome of stepping the ladder forward before a send is attempted.
#[derive(Debug, Clone)]
pub struct EscalationTick {
    pub level: EscalationLevel,
    /// `false` only at `human`: the ladder caps out there and the caller
    /// must not attempt another send.
    pub should_send: bool,
    pub time_promotion: Option<EscalationTransition>,
}

/// Step 1 of a triggering: fetch or create the ladder state, promote by
/// elapsed time if configured, and report whether a send should follow.
pub fn begin_tick(
    states: &mut EscalationStateMap,
    reaction_key: &str,
    now: DateTime<Utc>,
    policy: &EscalationPolicy,
) -> EscalationTick {
    let state = states
        .entry(reaction_key.to_string())
        .or_insert_with(|| ReactionEscalationState::new(now));
    state.last_triggered_at = now;

    let mut time_promotion = None;
    if let Some(threshold_ms) = policy.time_thresholds_ms.for_level(state.level) {
        let elapsed_ms = (now - state.level_entered_at).num_milliseconds();
        if elapsed_ms >= threshold_ms && state.promote(now, PromotionReason::TimeThreshold) {
            time_promotion = state.history.last().cloned();
        }
    }

    EscalationTick {
        level: state.level,
        should_send: state.level != EscalationLevel::Human,
        time_promotion,
    }
}

/// Step 2: record whether the attempted send succeeded. Clears the tracker
/// on success; on failure, bumps the attempt counters and promotes by retry
/// count once `attemptsInLevel` exceeds the policy's threshold for the
/// current level.
pub fn record_result(
    states: &mut EscalationStateMap,
    reaction_key: &str,
    now: DateTime<Utc>,
    policy: &EscalationPolicy,
    success: bool,
) -> Option<EscalationTransition> {
    if success {
        clear(states, reaction_key);
        return None;
    }

    let state = states.get_mut(reaction_key)?;
    state.attempts_in_level += 1;
    state.total_attempts += 1;

    let retry_threshold = policy.retry_counts.for_level(state.level);
    if state.attempts_in_level > retry_threshold && state.promote(now, PromotionReason::RetryCount) {
        return state.history.last().cloned();
    }
    None
}

/// Clear the ladder state for a reaction key once it stops firing, or once
/// a send finally succeeds.
pub fn clear(states: &mut EscalationStateMap, reaction_key: &str) {
    states.remove(reaction_key);
}

#[cfg(test)]
#[path = "escalation_tests.rs"]
mod tests;
