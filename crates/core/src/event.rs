// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events emitted by the lifecycle manager (spec.md §6 "Events emitted").

use serde::{Deserialize, Serialize};
use std::fmt;

/// A dotted event type string, e.g. `ci.failing`, `merge.completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    SessionWorking,
    VerifierPending,
    VerifierFailed,
    VerifierPassed,
    ReviewerPending,
    ReviewerFailed,
    ReviewerPassed,
    PrCreated,
    CiFailing,
    ReviewPending,
    ReviewChangesRequested,
    ReviewApproved,
    MergeReady,
    MergeCompleted,
    SessionNeedsInput,
    SessionStuck,
    SessionErrored,
    SessionKilled,
    AutomatedReviewFound,
    SummaryAllComplete,
    ReactionTriggered,
    ReactionEscalated,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::SessionWorking => "session.working",
            EventType::VerifierPending => "verifier.pending",
            EventType::VerifierFailed => "verifier.failed",
            EventType::VerifierPassed => "verifier.passed",
            EventType::ReviewerPending => "reviewer.pending",
            EventType::ReviewerFailed => "reviewer.failed",
            EventType::ReviewerPassed => "reviewer.passed",
            EventType::PrCreated => "pr.created",
            EventType::CiFailing => "ci.failing",
            EventType::ReviewPending => "review.pending",
            EventType::ReviewChangesRequested => "review.changes_requested",
            EventType::ReviewApproved => "review.approved",
            EventType::MergeReady => "merge.ready",
            EventType::MergeCompleted => "merge.completed",
            EventType::SessionNeedsInput => "session.needs_input",
            EventType::SessionStuck => "session.stuck",
            EventType::SessionErrored => "session.errored",
            EventType::SessionKilled => "session.killed",
            EventType::AutomatedReviewFound => "automated_review.found",
            EventType::SummaryAllComplete => "summary.all_complete",
            EventType::ReactionTriggered => "reaction.triggered",
            EventType::ReactionEscalated => "reaction.escalated",
        }
    }

    /// Map a `SessionStatus` transition target to the event type it fires,
    /// per the table in spec.md §4.3.3. Returns `None` for statuses that
    /// don't have a 1:1 event (e.g. intermediate `PrOpen`, which doesn't
    /// itself map -- `PrCreated` covers first-detection, handled by the
    /// caller separately).
    pub fn for_target_status(status: crate::SessionStatus) -> Option<EventType> {
        use crate::SessionStatus as S;
        Some(match status {
            S::Working => EventType::SessionWorking,
            S::VerifierPending => EventType::VerifierPending,
            S::VerifierFailed => EventType::VerifierFailed,
            S::PrReady => EventType::VerifierPassed,
            S::ReviewerPending => EventType::ReviewerPending,
            S::ReviewerFailed => EventType::ReviewerFailed,
            S::ReviewerPassed => EventType::ReviewerPassed,
            S::CiFailed => EventType::CiFailing,
            S::ReviewPending => EventType::ReviewPending,
            S::ChangesRequested => EventType::ReviewChangesRequested,
            S::Approved => EventType::ReviewApproved,
            S::Mergeable => EventType::MergeReady,
            S::Merged => EventType::MergeCompleted,
            S::NeedsInput => EventType::SessionNeedsInput,
            S::Stuck => EventType::SessionStuck,
            S::Errored => EventType::SessionErrored,
            S::Killed => EventType::SessionKilled,
            S::Spawning | S::Done | S::PrOpen | S::Cleanup | S::Terminated => return None,
        })
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Notification priority, inferred from the event type (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Info,
    Warning,
    Action,
    Urgent,
}

impl EventType {
    /// Priority inference: `stuck|needs_input|errored` -> urgent;
    /// `approved|passed|ready|merged|completed` -> action;
    /// `fail|changes_requested|conflicts` -> warning; `summary.*` -> info.
    pub fn priority(self) -> Priority {
        match self {
            EventType::SessionStuck | EventType::SessionNeedsInput | EventType::SessionErrored => {
                Priority::Urgent
            }
            EventType::ReviewApproved
            | EventType::VerifierPassed
            | EventType::ReviewerPassed
            | EventType::MergeReady
            | EventType::MergeCompleted => Priority::Action,
            EventType::VerifierFailed
            | EventType::ReviewerFailed
            | EventType::CiFailing
            | EventType::ReviewChangesRequested => Priority::Warning,
            EventType::SummaryAllComplete => Priority::Info,
            EventType::SessionWorking
            | EventType::ReviewerPending
            | EventType::VerifierPending
            | EventType::PrCreated
            | EventType::ReviewPending
            | EventType::SessionKilled
            | EventType::AutomatedReviewFound
            | EventType::ReactionTriggered => Priority::Info,
            EventType::ReactionEscalated => Priority::Urgent,
        }
    }
}

/// An occurrence of an `EventType` against a specific session, handed to the
/// reaction/notification pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_type: EventType,
    pub session_id: crate::SessionId,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Event {
    pub fn new(event_type: EventType, session_id: crate::SessionId) -> Self {
        Self {
            event_type,
            priority: event_type.priority(),
            session_id,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
