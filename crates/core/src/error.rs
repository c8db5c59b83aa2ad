// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared across the orchestrator (spec.md §7), grouped by
//! kind rather than by call site so CLI/RPC layers (out of scope here) have
//! one enum to match on.

use thiserror::Error;

/// Errors `SessionManager` operations may surface to their caller.
/// Everything in the polling path is caught locally instead (spec.md §7
/// "Propagation") and never constructs one of these.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("unknown project: {0}")]
    UnknownProject(String),

    #[error("spawn blocked by policy: {0}")]
    PolicyViolation(String),

    #[error("tracker authentication failed: {0}")]
    TrackerAuthFailure(String),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("session not restorable: {0} (status {status})")]
    SessionNotRestorable { id: String, status: String },

    #[error("workspace missing for session {0} and no restore capability")]
    WorkspaceMissing(String),

    #[error("plugin not registered: slot={slot} name={name}")]
    PluginNotFound { slot: String, name: String },

    #[error("invalid session id: {0}")]
    InvalidId(String),

    #[error("metadata store error: {0}")]
    Metadata(String),

    #[error("plugin call failed: {0}")]
    Plugin(String),
}

impl OrchestratorError {
    /// `true` for errors that occur before any resource was created/mutated
    /// (spec.md §7 Validation/Policy kinds) — callers can treat these as
    /// "surfaced, no cleanup required".
    pub fn is_pre_flight(&self) -> bool {
        matches!(
            self,
            OrchestratorError::UnknownProject(_)
                | OrchestratorError::PolicyViolation(_)
                | OrchestratorError::TrackerAuthFailure(_)
        )
    }
}
