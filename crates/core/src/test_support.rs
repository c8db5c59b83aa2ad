// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test builders, gated behind the `test-support` feature so downstream
//! crates' tests can build a `Session` without repeating the boilerplate.

use crate::{ProjectId, Session, SessionId, SessionStatus};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Builder for a minimal valid `Session`, with sane defaults for everything
/// a test doesn't care about.
pub struct SessionBuilder {
    session: Session,
}

impl SessionBuilder {
    pub fn new(id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            session: Session {
                id: SessionId::new(id),
                project_id: ProjectId::new(project_id),
                status: SessionStatus::Spawning,
                activity: None,
                branch: None,
                issue_id: None,
                workspace_path: None,
                pr: None,
                runtime_handle: None,
                created_at: DateTime::UNIX_EPOCH,
                last_activity_at: None,
                restored_at: None,
                metadata: BTreeMap::new(),
            },
        }
    }

    pub fn status(mut self, status: SessionStatus) -> Self {
        self.session.status = status;
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.session.branch = Some(branch.into());
        self
    }

    pub fn issue_id(mut self, issue_id: impl Into<String>) -> Self {
        self.session.issue_id = Some(issue_id.into());
        self
    }

    pub fn workspace_path(mut self, path: impl Into<String>) -> Self {
        self.session.workspace_path = Some(path.into());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.session.metadata.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Session {
        self.session
    }
}
