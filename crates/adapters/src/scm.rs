// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SCM plugin contract (spec.md §6): source-control-platform integration
//! (PR state, CI, reviews, mergeability).

use crate::{CiCheck, CiSummary, Mergeability, PrState, Project, ReviewComment, ReviewDecision};
use ao_core::{PrRecord, Session};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScmError {
    #[error("PR detection failed: {0}")]
    DetectFailed(String),
    #[error("PR probe failed: {0}")]
    ProbeFailed(String),
    #[error("merge failed: {0}")]
    MergeFailed(String),
    #[error("close failed: {0}")]
    CloseFailed(String),
}

#[async_trait]
pub trait ScmPlugin: Send + Sync {
    fn name(&self) -> &str;

    /// `None` means no PR was found yet, not an error (spec.md §4.3 step 4).
    async fn detect_pr(&self, session: &Session, project: &Project) -> Result<Option<PrRecord>, ScmError>;

    async fn get_pr_state(&self, pr: &PrRecord) -> Result<PrState, ScmError>;

    async fn get_ci_summary(&self, pr: &PrRecord) -> Result<CiSummary, ScmError>;

    async fn get_ci_checks(&self, pr: &PrRecord) -> Result<Vec<CiCheck>, ScmError>;

    async fn get_review_decision(&self, pr: &PrRecord) -> Result<ReviewDecision, ScmError>;

    async fn get_pending_comments(&self, pr: &PrRecord) -> Result<Vec<ReviewComment>, ScmError>;

    async fn get_mergeability(&self, pr: &PrRecord) -> Result<Mergeability, ScmError>;

    /// All issue comments on the PR, oldest first — the reviewer gate
    /// (spec.md §4.3.2) scans these for `AO_REVIEWER_*` verdict markers.
    async fn get_issue_comments(&self, pr: &PrRecord) -> Result<Vec<ReviewComment>, ScmError>;

    async fn post_comment(&self, pr: &PrRecord, body: &str) -> Result<(), ScmError>;

    async fn merge_pr(&self, pr: &PrRecord) -> Result<(), ScmError>;

    async fn close_pr(&self, pr: &PrRecord) -> Result<(), ScmError>;
}

#[cfg(any(test, feature = "test-support"))]
#[path = "scm_fake.rs"]
pub mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeScmPlugin;
