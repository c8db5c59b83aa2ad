// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared value types that flow across plugin boundaries.

use ao_core::{ProjectId, SessionId};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A configured project (spec.md §1: "resolve the project").
#[derive(Debug, Clone)]
pub struct Project {
    pub id: ProjectId,
    pub root: PathBuf,
    pub default_branch: String,
    pub has_tracker: bool,
    pub has_scm: bool,
}

/// A plan task gating spawn under `policies.spawn.requireValidatedPlanTask`.
#[derive(Debug, Clone)]
pub struct PlanTask {
    pub plan_id: String,
    pub task_id: String,
    pub validated: bool,
}

/// Request shape for `SessionManager::spawn` (spec.md §4.2).
#[derive(Debug, Clone, Default)]
pub struct SpawnRequest {
    pub issue_id: Option<String>,
    pub branch: Option<String>,
    pub prompt: Option<String>,
    pub plan_task: Option<PlanTask>,
    pub agent: Option<String>,
    pub runtime: Option<String>,
}

/// Composed launch configuration handed to `AgentPlugin::get_launch_command`
/// and then `RuntimePlugin::create` (spec.md §4.2 step 8).
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub session_id: SessionId,
    pub project_id: ProjectId,
    pub workspace_path: PathBuf,
    pub branch: String,
    pub issue_id: Option<String>,
    pub prompt: Option<String>,
    pub acceptance_contract: Option<String>,
    pub environment: BTreeMap<String, String>,
    pub evidence_dir: PathBuf,
    /// Filled in by `AgentPlugin::get_launch_command` before the config is
    /// handed to `RuntimePlugin::create` (spec.md §4.2 step 8).
    pub launch_command: Option<String>,
}

/// An issue from the tracker (spec.md §6 Tracker contract).
#[derive(Debug, Clone)]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

/// Pull request state as reported by the SCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrState {
    Open,
    Merged,
    Closed,
}

/// CI aggregate summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiSummary {
    Passing,
    Failing,
    Pending,
    Unknown,
}

/// A single named CI check.
#[derive(Debug, Clone)]
pub struct CiCheck {
    pub name: String,
    pub passing: bool,
}

/// Review decision aggregate from the SCM's own (human) review feature,
/// distinct from the orchestrator's own reviewer gate (spec.md §4.3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Pending,
    Approved,
    ChangesRequested,
}

#[derive(Debug, Clone)]
pub struct ReviewComment {
    pub author: String,
    pub body: String,
    pub resolved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mergeability {
    pub mergeable: bool,
    pub has_conflicts: bool,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
