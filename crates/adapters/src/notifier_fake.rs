// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `NotifierPlugin` test double.

use super::NotifierError;
use crate::NotifierPlugin;
use ao_core::Event;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct State {
    sent: Vec<Event>,
    fails: bool,
}

#[derive(Clone, Default)]
pub struct FakeNotifierPlugin {
    name: String,
    state: Arc<Mutex<State>>,
}

impl FakeNotifierPlugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn set_fails(&self, fails: bool) {
        self.state.lock().fails = fails;
    }

    pub fn sent(&self) -> Vec<Event> {
        self.state.lock().sent.clone()
    }

    pub fn sent_count(&self) -> usize {
        self.state.lock().sent.len()
    }
}

#[async_trait]
impl NotifierPlugin for FakeNotifierPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    async fn notify(&self, event: &Event) -> Result<(), NotifierError> {
        if self.state.lock().fails {
            return Err(NotifierError::Failed("scripted failure".into()));
        }
        self.state.lock().sent.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "notifier_fake_tests.rs"]
mod tests;
