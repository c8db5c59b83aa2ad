// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `WorkspacePlugin` test double.

use super::{WorkspaceCreateRequest, WorkspaceError, WorkspaceInfo, WorkspacePlugin};
use ao_core::ProjectId;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Default)]
struct State {
    by_path: BTreeMap<PathBuf, WorkspaceInfo>,
    by_project: BTreeMap<String, Vec<PathBuf>>,
    restorable: bool,
    create_fails: bool,
}

#[derive(Clone, Default)]
pub struct FakeWorkspacePlugin {
    name: String,
    state: Arc<Mutex<State>>,
}

impl FakeWorkspacePlugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn set_restorable(&self, restorable: bool) {
        self.state.lock().restorable = restorable;
    }

    pub fn set_create_fails(&self, fails: bool) {
        self.state.lock().create_fails = fails;
    }

    pub fn remove(&self, path: &Path) {
        self.state.lock().by_path.remove(path);
    }

    pub fn exists_on_disk(&self, path: &Path) -> bool {
        self.state.lock().by_path.contains_key(path)
    }
}

#[async_trait]
impl WorkspacePlugin for FakeWorkspacePlugin {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create(&self, req: &WorkspaceCreateRequest) -> Result<WorkspaceInfo, WorkspaceError> {
        let mut state = self.state.lock();
        if state.create_fails {
            return Err(WorkspaceError::CreateFailed("scripted failure".into()));
        }
        let path = PathBuf::from(format!("/fake-workspaces/{}", req.session_id));
        let info = WorkspaceInfo {
            path: path.clone(),
            branch: req.branch.clone(),
        };
        state.by_path.insert(path.clone(), info.clone());
        state
            .by_project
            .entry(req.project_id.as_str().to_string())
            .or_default()
            .push(path);
        Ok(info)
    }

    async fn destroy(&self, path: &Path) -> Result<(), WorkspaceError> {
        self.state.lock().by_path.remove(path);
        Ok(())
    }

    async fn list(&self, project_id: &ProjectId) -> Result<Vec<WorkspaceInfo>, WorkspaceError> {
        let state = self.state.lock();
        Ok(state
            .by_project
            .get(project_id.as_str())
            .into_iter()
            .flatten()
            .filter_map(|p| state.by_path.get(p).cloned())
            .collect())
    }

    async fn exists(&self, path: &Path) -> Result<bool, WorkspaceError> {
        Ok(self.state.lock().by_path.contains_key(path))
    }

    async fn restore(&self, req: &WorkspaceCreateRequest) -> Result<Option<WorkspaceInfo>, WorkspaceError> {
        let state = self.state.lock();
        if !state.restorable {
            return Ok(None);
        }
        drop(state);
        self.create(req).await.map(Some)
    }
}

#[cfg(test)]
#[path = "workspace_fake_tests.rs"]
mod tests;
