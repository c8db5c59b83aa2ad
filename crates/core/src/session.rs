// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Session` data model (spec.md §3).

use crate::ProjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub use crate::id::SessionId;

/// Current lifecycle status of a session.
///
/// Ordering here is not meaningful for comparison; it only groups related
/// stages for readability. `Merged` and `Killed` are the terminal set —
/// once reached, no further non-terminal status may be persisted
/// (spec.md §8 invariant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Spawning,
    Working,
    NeedsInput,
    Stuck,
    Done,
    VerifierPending,
    VerifierFailed,
    PrReady,
    PrOpen,
    CiFailed,
    ReviewPending,
    ChangesRequested,
    Approved,
    ReviewerPending,
    ReviewerFailed,
    ReviewerPassed,
    Mergeable,
    Merged,
    Errored,
    Killed,
    Cleanup,
    Terminated,
}

impl SessionStatus {
    /// `true` for the two statuses spec.md §3 calls out as terminal: once
    /// reached, the session manager stops evaluating it in future sweeps.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Merged | SessionStatus::Killed)
    }

    /// Statuses `restore` is permitted to act on (spec.md §4.2).
    pub fn is_restorable(self) -> bool {
        matches!(
            self,
            SessionStatus::Killed | SessionStatus::Errored | SessionStatus::Terminated
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Spawning => "spawning",
            SessionStatus::Working => "working",
            SessionStatus::NeedsInput => "needs_input",
            SessionStatus::Stuck => "stuck",
            SessionStatus::Done => "done",
            SessionStatus::VerifierPending => "verifier_pending",
            SessionStatus::VerifierFailed => "verifier_failed",
            SessionStatus::PrReady => "pr_ready",
            SessionStatus::PrOpen => "pr_open",
            SessionStatus::CiFailed => "ci_failed",
            SessionStatus::ReviewPending => "review_pending",
            SessionStatus::ChangesRequested => "changes_requested",
            SessionStatus::Approved => "approved",
            SessionStatus::ReviewerPending => "reviewer_pending",
            SessionStatus::ReviewerFailed => "reviewer_failed",
            SessionStatus::ReviewerPassed => "reviewer_passed",
            SessionStatus::Mergeable => "mergeable",
            SessionStatus::Merged => "merged",
            SessionStatus::Errored => "errored",
            SessionStatus::Killed => "killed",
            SessionStatus::Cleanup => "cleanup",
            SessionStatus::Terminated => "terminated",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "spawning" => SessionStatus::Spawning,
            "working" => SessionStatus::Working,
            "needs_input" => SessionStatus::NeedsInput,
            "stuck" => SessionStatus::Stuck,
            "done" => SessionStatus::Done,
            "verifier_pending" => SessionStatus::VerifierPending,
            "verifier_failed" => SessionStatus::VerifierFailed,
            "pr_ready" => SessionStatus::PrReady,
            "pr_open" => SessionStatus::PrOpen,
            "ci_failed" => SessionStatus::CiFailed,
            "review_pending" => SessionStatus::ReviewPending,
            "changes_requested" => SessionStatus::ChangesRequested,
            "approved" => SessionStatus::Approved,
            "reviewer_pending" => SessionStatus::ReviewerPending,
            "reviewer_failed" => SessionStatus::ReviewerFailed,
            "reviewer_passed" => SessionStatus::ReviewerPassed,
            "mergeable" => SessionStatus::Mergeable,
            "merged" => SessionStatus::Merged,
            "errored" => SessionStatus::Errored,
            "killed" => SessionStatus::Killed,
            "cleanup" => SessionStatus::Cleanup,
            "terminated" => SessionStatus::Terminated,
            other => return Err(format!("unknown session status: {other}")),
        })
    }
}

/// Activity as reported by the agent's own introspection, distinct from the
/// lifecycle-derived `status`. `None` means "unknown" — the agent adapter
/// gave no signal, not that the session is idle (spec.md §4.2 `list`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Active,
    Idle,
    WaitingInput,
    Blocked,
    Exited,
}

/// A pull request associated with a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrRecord {
    pub number: u64,
    pub url: String,
    pub owner: String,
    pub repo: String,
    pub head: String,
    pub base: String,
    pub draft: bool,
}

/// Opaque token identifying the agent process to the owning runtime plugin.
///
/// `data` is plugin-private; only the producing runtime parses it. The core
/// never inspects it beyond passing it back to the same plugin
/// (spec.md §6 "Opaque runtime handles").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeHandle {
    pub id: String,
    pub runtime_name: String,
    pub data: String,
}

impl RuntimeHandle {
    pub fn new(id: impl Into<String>, runtime_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            runtime_name: runtime_name.into(),
            data: String::new(),
        }
    }
}

/// The unit of autonomous work (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub project_id: ProjectId,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<Activity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr: Option<PrRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_handle: Option<RuntimeHandle>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restored_at: Option<DateTime<Utc>>,
    /// Free-form durable key-value bag: plugin-private fields, verifier/reviewer
    /// bookkeeping, escalation state, evidence file paths.
    pub metadata: BTreeMap<String, String>,
}

impl Session {
    /// `metadata["role"]`, used to distinguish worker sessions from the
    /// verifier/reviewer sessions the lifecycle manager spawns for them.
    pub fn role(&self) -> Option<&str> {
        self.metadata.get("role").map(String::as_str)
    }

    pub fn is_verifier(&self) -> bool {
        self.role() == Some("verifier")
    }

    pub fn is_reviewer(&self) -> bool {
        self.role() == Some("reviewer")
    }

    /// Update `last_activity_at` monotonically: never move it backwards
    /// (spec.md §4.2 `list`).
    pub fn bump_last_activity(&mut self, candidate: DateTime<Utc>) {
        match self.last_activity_at {
            Some(existing) if existing >= candidate => {}
            _ => self.last_activity_at = Some(candidate),
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
