// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `ScmPlugin` test double, keyed by PR number.

use super::ScmError;
use crate::{CiCheck, CiSummary, Mergeability, PrState, Project, ReviewComment, ReviewDecision, ScmPlugin};
use ao_core::{PrRecord, Session};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Default, Clone)]
struct PrFixture {
    state: PrStateOrDefault,
    ci: CiSummary,
    checks: Vec<CiCheck>,
    review: ReviewDecisionOrDefault,
    pending_comments: Vec<ReviewComment>,
    issue_comments: Vec<ReviewComment>,
    mergeability: Mergeability,
    posted: Vec<String>,
    merged: bool,
    closed: bool,
}

#[derive(Clone, Copy)]
struct PrStateOrDefault(PrState);
impl Default for PrStateOrDefault {
    fn default() -> Self {
        Self(PrState::Open)
    }
}

#[derive(Clone, Copy)]
struct ReviewDecisionOrDefault(ReviewDecision);
impl Default for ReviewDecisionOrDefault {
    fn default() -> Self {
        Self(ReviewDecision::Pending)
    }
}

impl Default for CiSummary {
    fn default() -> Self {
        CiSummary::Unknown
    }
}

impl Default for Mergeability {
    fn default() -> Self {
        Mergeability {
            mergeable: false,
            has_conflicts: false,
        }
    }
}

#[derive(Default)]
struct State {
    detected_pr: BTreeMap<String, PrRecord>,
    fixtures: BTreeMap<u64, PrFixture>,
}

#[derive(Clone, Default)]
pub struct FakeScmPlugin {
    name: String,
    state: Arc<Mutex<State>>,
}

impl FakeScmPlugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn set_detected_pr(&self, session_id: &str, pr: PrRecord) {
        self.state.lock().detected_pr.insert(session_id.to_string(), pr);
    }

    pub fn set_pr_state(&self, pr_number: u64, state: PrState) {
        self.state.lock().fixtures.entry(pr_number).or_default().state.0 = state;
    }

    pub fn set_ci_summary(&self, pr_number: u64, ci: CiSummary) {
        self.state.lock().fixtures.entry(pr_number).or_default().ci = ci;
    }

    pub fn set_ci_checks(&self, pr_number: u64, checks: Vec<CiCheck>) {
        self.state.lock().fixtures.entry(pr_number).or_default().checks = checks;
    }

    pub fn set_review_decision(&self, pr_number: u64, decision: ReviewDecision) {
        self.state.lock().fixtures.entry(pr_number).or_default().review.0 = decision;
    }

    pub fn set_pending_comments(&self, pr_number: u64, comments: Vec<ReviewComment>) {
        self.state.lock().fixtures.entry(pr_number).or_default().pending_comments = comments;
    }

    pub fn set_issue_comments(&self, pr_number: u64, comments: Vec<ReviewComment>) {
        self.state.lock().fixtures.entry(pr_number).or_default().issue_comments = comments;
    }

    pub fn set_mergeability(&self, pr_number: u64, mergeability: Mergeability) {
        self.state.lock().fixtures.entry(pr_number).or_default().mergeability = mergeability;
    }

    pub fn posted_comments(&self, pr_number: u64) -> Vec<String> {
        self.state
            .lock()
            .fixtures
            .get(&pr_number)
            .map(|f| f.posted.clone())
            .unwrap_or_default()
    }

    pub fn is_merged(&self, pr_number: u64) -> bool {
        self.state.lock().fixtures.get(&pr_number).map(|f| f.merged).unwrap_or(false)
    }

    pub fn is_closed(&self, pr_number: u64) -> bool {
        self.state.lock().fixtures.get(&pr_number).map(|f| f.closed).unwrap_or(false)
    }
}

#[async_trait]
impl ScmPlugin for FakeScmPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    async fn detect_pr(&self, session: &Session, _project: &Project) -> Result<Option<PrRecord>, ScmError> {
        Ok(self.state.lock().detected_pr.get(session.id.as_str()).cloned())
    }

    async fn get_pr_state(&self, pr: &PrRecord) -> Result<PrState, ScmError> {
        Ok(self.state.lock().fixtures.entry(pr.number).or_default().state.0)
    }

    async fn get_ci_summary(&self, pr: &PrRecord) -> Result<CiSummary, ScmError> {
        Ok(self.state.lock().fixtures.entry(pr.number).or_default().ci)
    }

    async fn get_ci_checks(&self, pr: &PrRecord) -> Result<Vec<CiCheck>, ScmError> {
        Ok(self.state.lock().fixtures.entry(pr.number).or_default().checks.clone())
    }

    async fn get_review_decision(&self, pr: &PrRecord) -> Result<ReviewDecision, ScmError> {
        Ok(self.state.lock().fixtures.entry(pr.number).or_default().review.0)
    }

    async fn get_pending_comments(&self, pr: &PrRecord) -> Result<Vec<ReviewComment>, ScmError> {
        Ok(self
            .state
            .lock()
            .fixtures
            .entry(pr.number)
            .or_default()
            .pending_comments
            .clone())
    }

    async fn get_mergeability(&self, pr: &PrRecord) -> Result<Mergeability, ScmError> {
        Ok(self.state.lock().fixtures.entry(pr.number).or_default().mergeability)
    }

    async fn get_issue_comments(&self, pr: &PrRecord) -> Result<Vec<ReviewComment>, ScmError> {
        Ok(self
            .state
            .lock()
            .fixtures
            .entry(pr.number)
            .or_default()
            .issue_comments
            .clone())
    }

    async fn post_comment(&self, pr: &PrRecord, body: &str) -> Result<(), ScmError> {
        self.state
            .lock()
            .fixtures
            .entry(pr.number)
            .or_default()
            .posted
            .push(body.to_string());
        Ok(())
    }

    async fn merge_pr(&self, pr: &PrRecord) -> Result<(), ScmError> {
        self.state.lock().fixtures.entry(pr.number).or_default().merged = true;
        Ok(())
    }

    async fn close_pr(&self, pr: &PrRecord) -> Result<(), ScmError> {
        self.state.lock().fixtures.entry(pr.number).or_default().closed = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "scm_fake_tests.rs"]
mod tests;
