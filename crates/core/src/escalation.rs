// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Escalation ladder state (spec.md §3 `ReactionEscalationState`, §4.3.4).
//!
//! One of these exists per (session, reaction key), serialized into the
//! worker's metadata under the `escalationState` key so the ladder survives
//! orchestrator restarts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Position on the fixed four-step promotion ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationLevel {
    Worker,
    Verifier,
    Orchestrator,
    Human,
}

impl EscalationLevel {
    /// The next level up, or `None` if already at the top.
    pub fn promote(self) -> Option<Self> {
        match self {
            EscalationLevel::Worker => Some(EscalationLevel::Verifier),
            EscalationLevel::Verifier => Some(EscalationLevel::Orchestrator),
            EscalationLevel::Orchestrator => Some(EscalationLevel::Human),
            EscalationLevel::Human => None,
        }
    }
}

/// Why a promotion happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionReason {
    RetryCount,
    TimeThreshold,
}

/// One recorded transition in the ladder's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationTransition {
    pub from: EscalationLevel,
    pub to: EscalationLevel,
    pub at: DateTime<Utc>,
    pub reason: PromotionReason,
    pub attempts_in_level: u32,
    pub total_attempts: u32,
    pub elapsed_ms: i64,
}

/// Per-(session, reaction key) escalation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionEscalationState {
    pub level: EscalationLevel,
    pub first_triggered_at: DateTime<Utc>,
    pub level_entered_at: DateTime<Utc>,
    pub last_triggered_at: DateTime<Utc>,
    pub attempts_in_level: u32,
    pub total_attempts: u32,
    pub history: Vec<EscalationTransition>,
}

impl ReactionEscalationState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            level: EscalationLevel::Worker,
            first_triggered_at: now,
            level_entered_at: now,
            last_triggered_at: now,
            attempts_in_level: 0,
            total_attempts: 0,
            history: Vec::new(),
        }
    }

    /// Promote one level, recording the transition. No-op at `Human`.
    pub fn promote(&mut self, now: DateTime<Utc>, reason: PromotionReason) -> bool {
        let Some(next) = self.level.promote() else {
            return false;
        };
        let elapsed_ms = (now - self.level_entered_at).num_milliseconds();
        self.history.push(EscalationTransition {
            from: self.level,
            to: next,
            at: now,
            reason,
            attempts_in_level: self.attempts_in_level,
            total_attempts: self.total_attempts,
            elapsed_ms,
        });
        self.level = next;
        self.level_entered_at = now;
        self.attempts_in_level = 0;
        true
    }
}

/// The durable bag of escalation states keyed by reaction key, serialized
/// into/out of the single `escalationState` metadata value.
pub type EscalationStateMap = BTreeMap<String, ReactionEscalationState>;

pub fn serialize_escalation_map(map: &EscalationStateMap) -> Result<String, serde_json::Error> {
    serde_json::to_string(map)
}

pub fn deserialize_escalation_map(value: &str) -> Result<EscalationStateMap, serde_json::Error> {
    if value.trim().is_empty() {
        return Ok(EscalationStateMap::new());
    }
    serde_json::from_str(value)
}

#[cfg(test)]
#[path = "escalation_tests.rs"]
mod tests;
