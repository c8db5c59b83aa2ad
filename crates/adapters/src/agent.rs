// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent plugin contract (spec.md §6): owns the launch/introspection
//! contract for an autonomous coding agent.

use crate::LaunchConfig;
use ao_core::{Activity, RuntimeHandle, Session};
use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("launch command failed: {0}")]
    LaunchFailed(String),
    #[error("introspection failed: {0}")]
    IntrospectionFailed(String),
}

/// Opaque session-level info surfaced for display; shape is agent-specific.
#[derive(Debug, Clone, Default)]
pub struct AgentSessionInfo {
    pub summary: Option<String>,
    pub fields: BTreeMap<String, String>,
}

#[async_trait]
pub trait AgentPlugin: Send + Sync {
    fn name(&self) -> &str;

    async fn get_launch_command(&self, cfg: &LaunchConfig) -> Result<String, AgentError>;

    /// `None` means "no restore-specific command; use `get_launch_command`"
    /// (spec.md §4.2 `restore`).
    async fn get_restore_command(&self, cfg: &LaunchConfig) -> Result<Option<String>, AgentError> {
        let _ = cfg;
        Ok(None)
    }

    async fn get_environment(&self, cfg: &LaunchConfig) -> Result<BTreeMap<String, String>, AgentError>;

    /// Classify raw terminal output. Called only when output is non-empty
    /// (spec.md §4.3 step 3: empty output means the probe failed, not that
    /// the agent is idle).
    fn detect_activity(&self, output: &str) -> Option<Activity>;

    /// `None` is an explicit "unknown", not "idle" (spec.md §4.2 `list`).
    async fn get_activity_state(&self, session: &Session) -> Result<Option<Activity>, AgentError>;

    async fn is_process_running(&self, handle: &RuntimeHandle) -> Result<bool, AgentError>;

    async fn get_session_info(&self, session: &Session) -> Result<Option<AgentSessionInfo>, AgentError> {
        let _ = session;
        Ok(None)
    }

    async fn setup_workspace_hooks(&self, cfg: &LaunchConfig) -> Result<(), AgentError> {
        let _ = cfg;
        Ok(())
    }

    async fn post_launch_setup(&self, session: &Session) -> Result<(), AgentError> {
        let _ = session;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[path = "agent_fake.rs"]
pub mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeAgentPlugin;
