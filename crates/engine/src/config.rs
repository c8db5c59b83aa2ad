// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Policy configuration consumed by the session and lifecycle managers.
//!
//! The YAML loader that produces these values is out of scope (spec.md §1);
//! callers (the daemon, or a test) build an [`OrchestratorConfig`] directly.

use ao_core::Priority;
use std::collections::BTreeMap;

/// `policies.spawn` (spec.md §4.2 step 2).
#[derive(Debug, Clone, Default)]
pub struct SpawnPolicy {
    pub require_validated_plan_task: bool,
}

/// `policies.reviewer` (spec.md §4.3.2).
#[derive(Debug, Clone)]
pub struct ReviewerPolicy {
    /// K in the K-of-N reviewer gate; spec.md floors this at 2.
    pub reviewer_count: usize,
    pub min_reviewer_agent_approvals: usize,
    pub require_evidence: bool,
    pub max_cycles: u32,
}

impl Default for ReviewerPolicy {
    fn default() -> Self {
        Self {
            reviewer_count: 2,
            min_reviewer_agent_approvals: 2,
            require_evidence: true,
            max_cycles: 3,
        }
    }
}

impl ReviewerPolicy {
    pub fn effective_reviewer_count(&self) -> usize {
        self.reviewer_count.max(2)
    }

    /// `max(2, maxCycles)` transient-failure retry budget (spec.md §4.3.2,
    /// §8 boundary behavior).
    pub fn transient_failure_budget(&self) -> u32 {
        self.max_cycles.max(2)
    }
}

/// What a reaction does when triggered (spec.md §4.3.3, glossary "Reaction").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionAction {
    SendToAgent,
    Notify,
    AutoMerge,
}

/// Per-level retry/time-threshold pair driving the escalation ladder
/// (spec.md §4.3.4).
#[derive(Debug, Clone, Copy)]
pub struct LevelCounts {
    pub worker: u32,
    pub verifier: u32,
    pub orchestrator: u32,
}

impl LevelCounts {
    pub fn for_level(self, level: ao_core::EscalationLevel) -> u32 {
        use ao_core::EscalationLevel as L;
        match level {
            L::Worker => self.worker,
            L::Verifier => self.verifier,
            L::Orchestrator => self.orchestrator,
            L::Human => u32::MAX,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LevelThresholdsMs {
    pub worker: Option<i64>,
    pub verifier: Option<i64>,
    pub orchestrator: Option<i64>,
}

impl LevelThresholdsMs {
    pub fn for_level(self, level: ao_core::EscalationLevel) -> Option<i64> {
        use ao_core::EscalationLevel as L;
        match level {
            L::Worker => self.worker,
            L::Verifier => self.verifier,
            L::Orchestrator => self.orchestrator,
            L::Human => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EscalationPolicy {
    pub retry_counts: LevelCounts,
    pub time_thresholds_ms: LevelThresholdsMs,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            retry_counts: LevelCounts {
                worker: 3,
                verifier: 2,
                orchestrator: 1,
            },
            time_thresholds_ms: LevelThresholdsMs::default(),
        }
    }
}

/// One configured automated response to an event (spec.md §4.3.3).
#[derive(Debug, Clone)]
pub struct ReactionConfig {
    pub action: ReactionAction,
    pub message: Option<String>,
    /// `auto=false` suppresses automatic execution except for `notify`
    /// reactions, which always run (spec.md §4.3.3, and §9's open question:
    /// `auto=false` with `action=send-to-agent` is treated as "skip").
    pub auto: bool,
    pub escalation: EscalationPolicy,
}

impl ReactionConfig {
    pub fn send_to_agent(message: impl Into<String>) -> Self {
        Self {
            action: ReactionAction::SendToAgent,
            message: Some(message.into()),
            auto: true,
            escalation: EscalationPolicy::default(),
        }
    }

    /// Whether this reaction actually executes when triggered (spec.md §9:
    /// `auto=false` + `send-to-agent` is nonsensical, treated as skip).
    pub fn should_execute(&self) -> bool {
        self.auto || self.action == ReactionAction::Notify
    }
}

/// Top-level policy bundle the session/lifecycle managers are constructed
/// with.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    pub spawn: SpawnPolicy,
    pub reviewer: ReviewerPolicy,
    /// Reaction key -> configuration (spec.md §4.3.3).
    pub reactions: BTreeMap<String, ReactionConfig>,
    /// Priority -> notifier names to dispatch to (spec.md §4.3.3
    /// `notificationRouting`).
    pub notification_routing: BTreeMap<Priority, Vec<String>>,
    /// Default runtime plugin name, used when `send` must synthesise a
    /// handle (spec.md §4.2 `send`).
    pub default_runtime: String,
    pub default_agent: String,
}

impl ReviewerPolicy {
    pub fn new() -> Self {
        Self::default()
    }
}
