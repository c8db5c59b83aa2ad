// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced by the session and lifecycle managers.
//!
//! Per spec.md §7: `determineStatus` and the polling loop never propagate a
//! plugin error -- they catch locally and treat the failure as "no signal".
//! This enum exists for the operations that *are* allowed to fail outward:
//! `spawn`, `send`, `kill`, `restore`, `cleanup`.

use ao_core::OrchestratorError;
use ao_storage::MetadataError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    #[error("metadata store error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("agent plugin error: {0}")]
    Agent(#[from] ao_adapters::AgentError),

    #[error("runtime plugin error: {0}")]
    Runtime(#[from] ao_adapters::RuntimeError),

    #[error("workspace plugin error: {0}")]
    Workspace(#[from] ao_adapters::WorkspaceError),

    #[error("tracker plugin error: {0}")]
    Tracker(#[from] ao_adapters::TrackerError),

    #[error("scm plugin error: {0}")]
    Scm(#[from] ao_adapters::ScmError),

    #[error("metadata field codec error: {0}")]
    Codec(#[from] serde_json::Error),
}
