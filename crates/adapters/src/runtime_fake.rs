// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `RuntimePlugin` test double with scriptable responses and call
//! recording, used by the session/lifecycle manager test suites since no
//! concrete runtime plugin is implemented here (spec.md §1 Non-goals).

use super::{RuntimeError, RuntimePlugin};
use crate::LaunchConfig;
use ao_core::RuntimeHandle;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum RuntimeCall {
    Create { session_id: String },
    Destroy { handle_id: String },
    SendMessage { handle_id: String, text: String },
    GetOutput { handle_id: String, lines: usize },
    IsAlive { handle_id: String },
}

#[derive(Default)]
struct State {
    calls: Vec<RuntimeCall>,
    alive: HashMap<String, bool>,
    output: HashMap<String, String>,
    send_failures: HashMap<String, u32>,
    next_id: u64,
}

/// Fake runtime plugin. By default every handle it creates is alive and
/// every `send_message` succeeds; call the `set_*` helpers to script
/// failures for escalation-ladder and liveness tests.
#[derive(Clone)]
pub struct FakeRuntimePlugin {
    name: String,
    state: Arc<Mutex<State>>,
}

impl FakeRuntimePlugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.state.lock().calls.clone()
    }

    pub fn set_alive(&self, handle_id: &str, alive: bool) {
        self.state.lock().alive.insert(handle_id.to_string(), alive);
    }

    pub fn set_output(&self, handle_id: &str, output: impl Into<String>) {
        self.state.lock().output.insert(handle_id.to_string(), output.into());
    }

    /// `send_message` fails this many times (then succeeds) for `handle_id`.
    pub fn fail_sends(&self, handle_id: &str, times: u32) {
        self.state.lock().send_failures.insert(handle_id.to_string(), times);
    }

    pub fn send_count(&self, handle_id: &str) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, RuntimeCall::SendMessage { handle_id: h, .. } if h == handle_id))
            .count()
    }
}

impl Default for FakeRuntimePlugin {
    fn default() -> Self {
        Self::new("fake")
    }
}

#[async_trait]
impl RuntimePlugin for FakeRuntimePlugin {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create(&self, cfg: &LaunchConfig) -> Result<RuntimeHandle, RuntimeError> {
        let mut state = self.state.lock();
        state.next_id += 1;
        let handle_id = format!("fake-handle-{}", state.next_id);
        state.alive.insert(handle_id.clone(), true);
        state.calls.push(RuntimeCall::Create {
            session_id: cfg.session_id.as_str().to_string(),
        });
        Ok(RuntimeHandle {
            id: handle_id,
            runtime_name: self.name.clone(),
            data: String::new(),
        })
    }

    async fn destroy(&self, handle: &RuntimeHandle) -> Result<(), RuntimeError> {
        let mut state = self.state.lock();
        state.alive.remove(&handle.id);
        state.calls.push(RuntimeCall::Destroy {
            handle_id: handle.id.clone(),
        });
        Ok(())
    }

    async fn send_message(&self, handle: &RuntimeHandle, text: &str) -> Result<(), RuntimeError> {
        let mut state = self.state.lock();
        state.calls.push(RuntimeCall::SendMessage {
            handle_id: handle.id.clone(),
            text: text.to_string(),
        });
        if let Some(remaining) = state.send_failures.get_mut(&handle.id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(RuntimeError::SendFailed(format!("scripted failure for {}", handle.id)));
            }
        }
        Ok(())
    }

    async fn get_output(&self, handle: &RuntimeHandle, lines: usize) -> Result<String, RuntimeError> {
        let mut state = self.state.lock();
        state.calls.push(RuntimeCall::GetOutput {
            handle_id: handle.id.clone(),
            lines,
        });
        Ok(state.output.get(&handle.id).cloned().unwrap_or_default())
    }

    async fn is_alive(&self, handle: &RuntimeHandle) -> Result<bool, RuntimeError> {
        let mut state = self.state.lock();
        state.calls.push(RuntimeCall::IsAlive {
            handle_id: handle.id.clone(),
        });
        Ok(*state.alive.get(&handle.id).unwrap_or(&false))
    }
}

#[cfg(test)]
#[path = "runtime_fake_tests.rs"]
mod tests;
