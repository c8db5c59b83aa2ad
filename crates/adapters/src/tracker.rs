// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracker plugin contract (spec.md §6): issue-system integration (branch
//! naming, completion check, prompt generation).

use crate::{Issue, Project};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("issue not found: {0}")]
    IssueNotFound(String),
    #[error("tracker authentication failed: {0}")]
    AuthFailure(String),
}

#[async_trait]
pub trait TrackerPlugin: Send + Sync {
    fn name(&self) -> &str;

    /// `Err(TrackerError::IssueNotFound)` is treated as ad-hoc mode by the
    /// session manager; any other error aborts spawn (spec.md §4.2 step 3).
    async fn get_issue(&self, id: &str, project: &Project) -> Result<Issue, TrackerError>;

    fn is_completed(&self, issue: &Issue) -> bool {
        issue.completed
    }

    fn issue_url(&self, id: &str, project: &Project) -> Option<String> {
        let _ = (id, project);
        None
    }

    /// `None` means the session manager falls back to `feat/<issueId>` or
    /// `session/<sessionId>` (spec.md §4.2 step 5).
    fn branch_name(&self, id: &str, project: &Project) -> Option<String> {
        let _ = (id, project);
        None
    }

    fn generate_prompt(&self, issue: &Issue, project: &Project) -> String {
        let _ = project;
        format!("Work on {}: {}", issue.id, issue.title)
    }

    /// The acceptance contract injected into the launch prompt, if the
    /// tracker provides one (spec.md §4.2 step 9). `None` by default.
    fn acceptance_contract(&self, issue: &Issue, project: &Project) -> Option<String> {
        let _ = (issue, project);
        None
    }
}

#[cfg(any(test, feature = "test-support"))]
#[path = "tracker_fake.rs"]
pub mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeTrackerPlugin;
