// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `AgentPlugin` test double.

use super::{AgentError, AgentPlugin, AgentSessionInfo};
use crate::LaunchConfig;
use ao_core::{Activity, RuntimeHandle, Session};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Default)]
struct State {
    running: BTreeMap<String, bool>,
    activity_states: BTreeMap<String, Option<Activity>>,
    restore_command: Option<String>,
    launch_calls: Vec<String>,
}

/// Fake agent plugin. `detect_activity` classifies a small fixed
/// vocabulary (`"waiting_input"`, `"active"`, `"idle"`, `"blocked"`,
/// `"exited"`) so tests can drive it with plain strings.
#[derive(Clone, Default)]
pub struct FakeAgentPlugin {
    name: String,
    state: Arc<Mutex<State>>,
}

impl FakeAgentPlugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn set_process_running(&self, handle_id: &str, running: bool) {
        self.state.lock().running.insert(handle_id.to_string(), running);
    }

    /// `None` means "unknown", matching the trait's own semantics for
    /// `get_activity_state` (spec.md §4.2 `list`).
    pub fn set_activity_state(&self, session_id: &str, activity: Option<Activity>) {
        self.state.lock().activity_states.insert(session_id.to_string(), activity);
    }

    pub fn set_restore_command(&self, command: impl Into<String>) {
        self.state.lock().restore_command = Some(command.into());
    }

    pub fn launch_calls(&self) -> Vec<String> {
        self.state.lock().launch_calls.clone()
    }
}

#[async_trait]
impl AgentPlugin for FakeAgentPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_launch_command(&self, cfg: &LaunchConfig) -> Result<String, AgentError> {
        let mut state = self.state.lock();
        state.launch_calls.push(cfg.session_id.as_str().to_string());
        Ok(format!("fake-agent --session {}", cfg.session_id))
    }

    async fn get_restore_command(&self, _cfg: &LaunchConfig) -> Result<Option<String>, AgentError> {
        Ok(self.state.lock().restore_command.clone())
    }

    async fn get_environment(&self, _cfg: &LaunchConfig) -> Result<BTreeMap<String, String>, AgentError> {
        Ok(BTreeMap::new())
    }

    fn detect_activity(&self, output: &str) -> Option<Activity> {
        match output.trim() {
            "waiting_input" => Some(Activity::WaitingInput),
            "active" => Some(Activity::Active),
            "idle" => Some(Activity::Idle),
            "blocked" => Some(Activity::Blocked),
            "exited" => Some(Activity::Exited),
            _ => None,
        }
    }

    async fn get_activity_state(&self, session: &Session) -> Result<Option<Activity>, AgentError> {
        Ok(self
            .state
            .lock()
            .activity_states
            .get(session.id.as_str())
            .copied()
            .unwrap_or(None))
    }

    async fn is_process_running(&self, handle: &RuntimeHandle) -> Result<bool, AgentError> {
        Ok(*self.state.lock().running.get(&handle.id).unwrap_or(&true))
    }

    async fn get_session_info(&self, _session: &Session) -> Result<Option<AgentSessionInfo>, AgentError> {
        Ok(None)
    }
}

#[cfg(test)]
#[path = "agent_fake_tests.rs"]
mod tests;
