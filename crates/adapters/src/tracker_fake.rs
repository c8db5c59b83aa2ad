// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `TrackerPlugin` test double.

use super::TrackerError;
use crate::{Issue, Project, TrackerPlugin};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Default)]
struct State {
    issues: BTreeMap<String, Issue>,
    branch_names: BTreeMap<String, String>,
    acceptance_contracts: BTreeMap<String, String>,
    auth_fails: bool,
}

#[derive(Clone, Default)]
pub struct FakeTrackerPlugin {
    name: String,
    state: Arc<Mutex<State>>,
}

impl FakeTrackerPlugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn add_issue(&self, issue: Issue) {
        self.state.lock().issues.insert(issue.id.clone(), issue);
    }

    pub fn set_branch_name(&self, issue_id: &str, branch: impl Into<String>) {
        self.state.lock().branch_names.insert(issue_id.to_string(), branch.into());
    }

    pub fn set_acceptance_contract(&self, issue_id: &str, contract: impl Into<String>) {
        self.state
            .lock()
            .acceptance_contracts
            .insert(issue_id.to_string(), contract.into());
    }

    pub fn set_auth_fails(&self, fails: bool) {
        self.state.lock().auth_fails = fails;
    }
}

#[async_trait]
impl TrackerPlugin for FakeTrackerPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_issue(&self, id: &str, _project: &Project) -> Result<Issue, TrackerError> {
        let state = self.state.lock();
        if state.auth_fails {
            return Err(TrackerError::AuthFailure("scripted failure".into()));
        }
        state
            .issues
            .get(id)
            .cloned()
            .ok_or_else(|| TrackerError::IssueNotFound(id.to_string()))
    }

    fn branch_name(&self, id: &str, _project: &Project) -> Option<String> {
        self.state.lock().branch_names.get(id).cloned()
    }

    fn acceptance_contract(&self, issue: &Issue, _project: &Project) -> Option<String> {
        self.state.lock().acceptance_contracts.get(&issue.id).cloned()
    }
}

#[cfg(test)]
#[path = "tracker_fake_tests.rs"]
mod tests;
