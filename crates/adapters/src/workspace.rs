// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace plugin contract (spec.md §6): owns the session's source tree.

use crate::Project;
use ao_core::{ProjectId, SessionId};
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("create failed: {0}")]
    CreateFailed(String),
    #[error("destroy failed: {0}")]
    DestroyFailed(String),
    #[error("restore not supported")]
    RestoreUnsupported,
}

#[derive(Debug, Clone)]
pub struct WorkspaceCreateRequest {
    pub project_id: ProjectId,
    pub session_id: SessionId,
    pub branch: String,
    pub project: Project,
}

#[derive(Debug, Clone)]
pub struct WorkspaceInfo {
    pub path: PathBuf,
    pub branch: String,
}

#[async_trait]
pub trait WorkspacePlugin: Send + Sync {
    fn name(&self) -> &str;

    async fn create(&self, req: &WorkspaceCreateRequest) -> Result<WorkspaceInfo, WorkspaceError>;

    async fn destroy(&self, path: &std::path::Path) -> Result<(), WorkspaceError>;

    async fn list(&self, project_id: &ProjectId) -> Result<Vec<WorkspaceInfo>, WorkspaceError>;

    async fn exists(&self, path: &std::path::Path) -> Result<bool, WorkspaceError>;

    /// `None` if this plugin doesn't support restoring a missing workspace
    /// (spec.md §4.2 `restore`: `WorkspaceMissing` is raised when both the
    /// path is gone and this returns `None`).
    async fn restore(&self, req: &WorkspaceCreateRequest) -> Result<Option<WorkspaceInfo>, WorkspaceError> {
        let _ = req;
        Ok(None)
    }
}

#[cfg(any(test, feature = "test-support"))]
#[path = "workspace_fake.rs"]
pub mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeWorkspacePlugin;
