// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle manager (spec.md §4.3): the polling loop that walks every
//! tracked session through `determineStatus`, fires the events/reactions a
//! transition implies, and drives the verifier and reviewer gates.
//!
//! `SessionManager::list`/`get` already apply stage 1 of `determineStatus`
//! (runtime liveness, via `project_activity`) by projecting a dead runtime's
//! session to `Killed` before this module ever sees it. Everything here
//! picks up from stage 2 onward.

use crate::config::{OrchestratorConfig, ReactionAction, ReactionConfig};
use crate::escalation::{begin_tick, record_result};
use crate::evidence_parser;
use crate::metadata_codec;
use crate::reaction::{build_message, reaction_key_for, ReactionContext};
use crate::session_manager::SessionManager;
use ao_adapters::{
    CiSummary, PluginRegistry, PrState, Project, ReviewComment, ReviewDecision, SpawnRequest,
};
use ao_core::{
    deserialize_escalation_map, serialize_escalation_map, Activity, Clock, EscalationLevel,
    EscalationStateMap, EscalationTransition, Event, EventType, Priority, ProjectId, Session,
    SessionId, SessionStatus,
};
use ao_storage::OutcomeMetrics;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// spec.md §4.3 "polling interval, default 30s".
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
/// Default bound on per-sweep concurrent session evaluations.
const DEFAULT_MAX_CONCURRENCY: usize = 8;
/// Lines of terminal output requested when probing agent activity.
const OUTPUT_PROBE_LINES: usize = 200;
/// Fixed pool of reviewer identities used to populate `AO_REVIEWER_ID`
/// markers and tag spawned reviewer sessions; the K-of-N gate never needs
/// more than this many concurrent reviewers.
const REVIEWER_ID_POOL: &[&str] = &["reviewer-a", "reviewer-b", "reviewer-c", "reviewer-d"];

/// Outcome of one sweep, returned for observability and tests.
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    pub evaluated: usize,
    pub transitioned: Vec<(SessionId, SessionStatus, SessionStatus)>,
    pub skipped_reentrant: bool,
}

/// Drives the polling loop described in spec.md §4.3. Cheap to `Clone`: all
/// shared state lives behind `Arc`, so a clone can be handed to a spawned
/// task without the task borrowing from the original.
#[derive(Clone)]
pub struct LifecycleManager<C: Clock> {
    session_manager: Arc<SessionManager<C>>,
    registry: Arc<PluginRegistry>,
    projects: Arc<BTreeMap<ProjectId, Project>>,
    config: Arc<OrchestratorConfig>,
    metrics: Arc<OutcomeMetrics>,
    clock: C,
    poll_interval: Duration,
    max_concurrency: usize,
    states: Arc<parking_lot::Mutex<BTreeMap<SessionId, SessionStatus>>>,
    running: Arc<AtomicBool>,
    summary_sent: Arc<AtomicBool>,
    stop_signal: Arc<tokio::sync::Notify>,
}

impl<C: Clock + 'static> LifecycleManager<C> {
    pub fn new(
        session_manager: Arc<SessionManager<C>>,
        registry: Arc<PluginRegistry>,
        projects: BTreeMap<ProjectId, Project>,
        config: OrchestratorConfig,
        metrics: OutcomeMetrics,
        clock: C,
    ) -> Self {
        Self {
            session_manager,
            registry,
            projects: Arc::new(projects),
            config: Arc::new(config),
            metrics: Arc::new(metrics),
            clock,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            states: Arc::new(parking_lot::Mutex::new(BTreeMap::new())),
            running: Arc::new(AtomicBool::new(false)),
            summary_sent: Arc::new(AtomicBool::new(false)),
            stop_signal: Arc::new(tokio::sync::Notify::new()),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    /// Run the polling loop until `request_stop` is called. Performs one
    /// immediate sweep on entry (spec.md §4.3: "starting the manager
    /// performs one immediate sweep"), then ticks every `poll_interval`.
    pub fn spawn_polling_loop(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!("lifecycle manager starting, performing immediate sweep");
            self.tick().await;
            let mut ticker = tokio::time::interval(self.poll_interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.tick().await;
                    }
                    _ = self.stop_signal.notified() => {
                        info!("lifecycle manager stopping");
                        break;
                    }
                }
            }
        })
    }

    pub fn request_stop(&self) {
        self.stop_signal.notify_one();
    }

    /// One sweep, guarded against re-entrancy: a sweep still running when the
    /// next tick fires is skipped rather than overlapped (spec.md §5
    /// "re-entrancy guard").
    #[instrument(skip(self))]
    pub async fn tick(&self) -> SweepReport {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("lifecycle sweep already running, skipping this tick");
            return SweepReport {
                skipped_reentrant: true,
                ..Default::default()
            };
        }
        let report = self.sweep_once().await;
        self.running.store(false, Ordering::SeqCst);
        report
    }

    async fn sweep_once(&self) -> SweepReport {
        let mut report = SweepReport::default();
        let sessions = match self.session_manager.list(None).await {
            Ok(sessions) => sessions,
            Err(err) => {
                warn!(%err, "lifecycle sweep: failed to list sessions");
                return report;
            }
        };

        let tracked_snapshot = self.states.lock().clone();
        let to_evaluate: Vec<Session> = sessions
            .iter()
            .filter(|s| !s.status.is_terminal() || tracked_snapshot.get(&s.id) != Some(&s.status))
            .cloned()
            .collect();

        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.max_concurrency));
        let mut join_set = tokio::task::JoinSet::new();
        for session in to_evaluate {
            let tracked = tracked_snapshot.get(&session.id).copied();
            let worker = self.clone();
            let semaphore = semaphore.clone();
            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                worker.evaluate_session(session, tracked).await
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((id, old, new)) => {
                    report.evaluated += 1;
                    if old != new {
                        report.transitioned.push((id.clone(), old, new));
                    }
                    self.states.lock().insert(id, new);
                }
                Err(err) => warn!(%err, "lifecycle sweep: session evaluation task panicked"),
            }
        }

        let live_ids: std::collections::BTreeSet<SessionId> =
            sessions.iter().map(|s| s.id.clone()).collect();
        self.states.lock().retain(|id, _| live_ids.contains(id));

        if !sessions.is_empty() && sessions.iter().all(|s| s.status.is_terminal()) {
            if !self.summary_sent.swap(true, Ordering::SeqCst) {
                if let Some(first) = sessions.first() {
                    let event = Event::new(EventType::SummaryAllComplete, first.id.clone());
                    self.notify_human(&event).await;
                }
            }
        } else {
            self.summary_sent.store(false, Ordering::SeqCst);
        }

        report
    }

    /// Evaluate one session, persist the result, and fire any transition
    /// reactions. Returns `(id, status-before-this-tick, status-after)`.
    async fn evaluate_session(
        &self,
        mut session: Session,
        tracked_before: Option<SessionStatus>,
    ) -> (SessionId, SessionStatus, SessionStatus) {
        let id = session.id.clone();
        let loaded_status = session.status;

        let new_status = match self.projects.get(&session.project_id) {
            Some(project) => self.determine_status(&mut session, project).await,
            None => {
                warn!(session = %id, "session references unknown project, skipping lifecycle evaluation");
                loaded_status
            }
        };

        let old_status = tracked_before.unwrap_or(loaded_status);
        session.status = new_status;
        session.bump_last_activity(self.clock.now());

        if old_status != new_status {
            self.record_transition(&mut session, old_status, new_status).await;
        } else {
            self.retry_pending_reaction(&mut session, new_status).await;
        }

        if let Ok(fields) = metadata_codec::encode(&session) {
            if let Err(err) = self.session_manager.metadata_store().write(&id, &fields) {
                warn!(%err, session = %id, "failed to persist lifecycle status");
            }
        }

        (id, old_status, new_status)
    }

    /// spec.md §4.3 steps 2-6 of `determineStatus` (step 1 is pre-applied by
    /// the session manager's `list`/`get`).
    async fn determine_status(&self, session: &mut Session, project: &Project) -> SessionStatus {
        if session.status == SessionStatus::Killed {
            return SessionStatus::Killed;
        }

        let is_helper = session.is_verifier() || session.is_reviewer();

        // Step 2: worker completion / verifier gate. Applies to helper
        // sessions too (their own evidence can mark them done), but a helper
        // never spawns a nested verifier for itself.
        if session.pr.is_none() {
            let evidence_complete = session
                .workspace_path
                .as_ref()
                .map(|p| evidence_parser::parse(std::path::Path::new(p), &session.id).is_complete())
                .unwrap_or(false);
            if evidence_complete {
                let pending_statuses = matches!(
                    session.status,
                    SessionStatus::Spawning
                        | SessionStatus::Working
                        | SessionStatus::NeedsInput
                        | SessionStatus::Stuck
                );
                if is_helper {
                    if pending_statuses {
                        return SessionStatus::Done;
                    }
                } else if let Some(status) = self.verifier_gate(session, project).await {
                    return status;
                } else if pending_statuses {
                    return SessionStatus::Done;
                }
            }
        }

        // Step 3: agent activity.
        if let Some(status) = self.probe_agent_activity(session).await {
            return status;
        }

        if is_helper {
            // spec.md §4.3: "roles verifier and reviewer skip stages 4-6" --
            // no PR lifecycle of their own, and no working-fallback coercion.
            return session.status;
        }

        // Steps 4-5: PR lifecycle.
        if let Some(scm) = self.registry.scm_for(project) {
            if session.pr.is_none() {
                if let Ok(Some(pr)) = scm.detect_pr(session, project).await {
                    info!(session = %session.id, pr = pr.number, "detected PR");
                    session.pr = Some(pr);
                    let event = Event::new(EventType::PrCreated, session.id.clone());
                    self.dispatch_event(session, &event).await;
                }
            }

            if let Some(pr) = session.pr.clone() {
                if let Ok(state) = scm.get_pr_state(&pr).await {
                    match state {
                        PrState::Merged => return SessionStatus::Merged,
                        PrState::Closed => return SessionStatus::Killed,
                        PrState::Open => {}
                    }
                }

                if matches!(scm.get_ci_summary(&pr).await, Ok(CiSummary::Failing)) {
                    return SessionStatus::CiFailed;
                }

                if let Some(status) = self.reviewer_gate(session, project, &pr).await {
                    if matches!(status, SessionStatus::ReviewerPending | SessionStatus::ReviewerFailed) {
                        return status;
                    }
                }

                return match scm.get_review_decision(&pr).await {
                    Ok(ReviewDecision::ChangesRequested) => SessionStatus::ChangesRequested,
                    Ok(ReviewDecision::Approved) => {
                        let verifier_passed = session
                            .metadata
                            .get("verifierPassed")
                            .map(|v| v == "true")
                            .unwrap_or(false);
                        let reviewer_passed = session
                            .metadata
                            .get("reviewerPassed")
                            .map(|v| v == "true")
                            .unwrap_or(false);
                        let merge_ready = scm.get_mergeability(&pr).await.map(|m| m.mergeable).unwrap_or(false);
                        let ci_green = matches!(scm.get_ci_summary(&pr).await, Ok(CiSummary::Passing));
                        if merge_ready && verifier_passed && reviewer_passed && ci_green {
                            SessionStatus::Mergeable
                        } else {
                            SessionStatus::Approved
                        }
                    }
                    Ok(ReviewDecision::Pending) => SessionStatus::ReviewPending,
                    Err(_) => SessionStatus::PrOpen,
                };
            }
        }

        // Step 6: fallback.
        if matches!(
            session.status,
            SessionStatus::Spawning | SessionStatus::Stuck | SessionStatus::NeedsInput
        ) {
            SessionStatus::Working
        } else {
            session.status
        }
    }

    async fn probe_agent_activity(&self, session: &Session) -> Option<SessionStatus> {
        let handle = session.runtime_handle.as_ref()?;
        let runtime = self.registry.runtime(&handle.runtime_name).ok()?;
        let output = match runtime.get_output(handle, OUTPUT_PROBE_LINES).await {
            Ok(output) if !output.is_empty() => output,
            _ => {
                // An empty/failed probe means the probe itself failed, not
                // that the agent is idle: keep whatever waiting status we
                // already had rather than inventing a new one.
                return if matches!(session.status, SessionStatus::Stuck | SessionStatus::NeedsInput) {
                    Some(session.status)
                } else {
                    None
                };
            }
        };

        let agent_name = session.metadata.get("agent")?;
        let agent = self.registry.agent(agent_name).ok()?;
        if let Some(Activity::WaitingInput) = agent.detect_activity(&output) {
            return Some(SessionStatus::NeedsInput);
        }
        if let Ok(false) = agent.is_process_running(handle).await {
            return Some(SessionStatus::Killed);
        }
        None
    }

    /// spec.md §4.3.1: spawn a secondary verifier session once evidence is
    /// complete, and fold its verdict back into this session's status once
    /// it reports one.
    async fn verifier_gate(&self, session: &mut Session, project: &Project) -> Option<SessionStatus> {
        let workspace_path = session.workspace_path.clone()?;
        let workspace_path = std::path::Path::new(&workspace_path);
        let report = evidence_parser::parse(workspace_path, &session.id);
        if !report.is_complete() {
            return None;
        }

        if session.metadata.get("verifierVerdict").is_none() {
            if let Some(verifier_id) = session.metadata.get("verifierSessionId").cloned() {
                if let Ok(Some(verifier_session)) =
                    self.session_manager.get(&SessionId::new(verifier_id)).await
                {
                    if let Some(verdict) = verifier_session.metadata.get("verifierVerdict").cloned() {
                        session.metadata.insert("verifierVerdict".to_string(), verdict);
                        if let Some(feedback) = verifier_session.metadata.get("verifierFeedback").cloned() {
                            session.metadata.insert("verifierFeedback".to_string(), feedback);
                        }
                    } else if verifier_session.status.is_terminal() {
                        session.metadata.insert("verifierVerdict".to_string(), "failed".to_string());
                        session.metadata.insert(
                            "verifierFeedback".to_string(),
                            "Verifier session exited without recording a verdict.".to_string(),
                        );
                    }
                }
            }
        }

        if let Some(verdict) = session.metadata.get("verifierVerdict").cloned() {
            return match verdict.as_str() {
                "passed" => {
                    session.metadata.insert("verifierPassed".to_string(), "true".to_string());
                    session.metadata.remove("verifierVerdict");
                    session.metadata.remove("verifierSessionId");
                    session.metadata.remove("verifierEvidenceFingerprint");
                    Some(SessionStatus::PrReady)
                }
                "failed" => {
                    let verifier_id = session.metadata.get("verifierSessionId").cloned().unwrap_or_default();
                    let already_sent = session
                        .metadata
                        .get("verifierFailureSentFor")
                        .map(|sent| sent == &verifier_id)
                        .unwrap_or(false);
                    if !already_sent && !verifier_id.is_empty() {
                        let feedback = session.metadata.get("verifierFeedback").cloned().unwrap_or_else(|| {
                            "Verifier reported failure with no further detail.".to_string()
                        });
                        if self.session_manager.send(&session.id, &feedback).await.is_ok() {
                            session
                                .metadata
                                .insert("verifierFailureSentFor".to_string(), verifier_id);
                        }
                    }
                    Some(SessionStatus::VerifierFailed)
                }
                _ => None,
            };
        }

        let already_spawned = session
            .metadata
            .get("verifierEvidenceFingerprint")
            .map(|fp| fp == &report.fingerprint)
            .unwrap_or(false);
        if !already_spawned {
            let prompt = format!(
                "Review the evidence for session {} and report a verdict. Set metadata \
                 verifierVerdict=passed or verifierVerdict=failed, plus verifierFeedback \
                 describing what's missing if failed.\n\n{}",
                session.id,
                summarize_evidence(&report),
            );
            match self
                .session_manager
                .spawn(
                    &project.id,
                    SpawnRequest {
                        prompt: Some(prompt),
                        ..Default::default()
                    },
                )
                .await
            {
                Ok(mut verifier_session) => {
                    verifier_session.metadata.insert("role".to_string(), "verifier".to_string());
                    verifier_session
                        .metadata
                        .insert("verifierFor".to_string(), session.id.as_str().to_string());
                    if let Ok(fields) = metadata_codec::encode(&verifier_session) {
                        let _ = self
                            .session_manager
                            .metadata_store()
                            .write(&verifier_session.id, &fields);
                    }
                    session
                        .metadata
                        .insert("verifierSessionId".to_string(), verifier_session.id.as_str().to_string());
                    session
                        .metadata
                        .insert("verifierEvidenceFingerprint".to_string(), report.fingerprint.clone());
                    session.metadata.remove("verifierFailureSentFor");
                }
                Err(err) => warn!(%err, session = %session.id, "failed to spawn verifier session"),
            }
        }

        Some(SessionStatus::VerifierPending)
    }

    /// spec.md §4.3.2: K-of-N reviewer gate, driven by `AO_REVIEWER_*`
    /// markers posted as PR issue comments.
    async fn reviewer_gate(
        &self,
        session: &mut Session,
        project: &Project,
        pr: &ao_core::PrRecord,
    ) -> Option<SessionStatus> {
        if session.metadata.get("reviewerPassed").map(|v| v == "true").unwrap_or(false) {
            return Some(SessionStatus::ReviewerPassed);
        }

        let policy = &self.config.reviewer;
        let cycle: u32 = session
            .metadata
            .get("reviewerCycle")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);

        if cycle > policy.max_cycles {
            self.escalate_reviewer_to_human(session).await;
            return Some(SessionStatus::ReviewerFailed);
        }

        let scm = self.registry.scm_for(project)?;

        let comments = match scm.get_issue_comments(pr).await {
            Ok(comments) => comments,
            Err(err) => {
                let failures: u32 = session
                    .metadata
                    .get("reviewerFetchFailures")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0)
                    + 1;
                session
                    .metadata
                    .insert("reviewerFetchFailures".to_string(), failures.to_string());
                if failures > policy.transient_failure_budget() {
                    self.escalate_reviewer_to_human(session).await;
                    return Some(SessionStatus::ReviewerFailed);
                }
                debug!(%err, session = %session.id, "reviewer verdict fetch failed, retrying next tick");
                return Some(SessionStatus::ReviewerPending);
            }
        };
        session.metadata.remove("reviewerFetchFailures");

        self.ensure_reviewers_spawned(session, project, cycle).await;

        let verdicts = latest_verdicts_for_cycle(&comments, cycle);
        let approvals = verdicts
            .values()
            .filter(|v| v.verdict == Verdict::Approve && (!policy.require_evidence || v.has_evidence))
            .count();
        let any_rejection = verdicts.values().any(|v| v.verdict == Verdict::Reject);

        if approvals >= policy.min_reviewer_agent_approvals {
            session.metadata.insert("reviewerPassed".to_string(), "true".to_string());
            session.metadata.remove("reviewerCycle");
            // One-time milestone, not an ongoing session status -- fired directly
            // here rather than through the transition diff, the same way PrCreated
            // is (first-detection events). The gate short-circuits on
            // "reviewerPassed" above, so this branch only runs once per session.
            let event = Event::new(EventType::ReviewerPassed, session.id.clone());
            self.dispatch_event(session, &event).await;
            return Some(SessionStatus::ReviewerPassed);
        }

        if any_rejection {
            let feedback = build_reviewer_feedback(&verdicts);
            let token = format!("{cycle}:{feedback}");
            let already_sent = session
                .metadata
                .get("reviewerFailureSentFor")
                .map(|sent| sent == &token)
                .unwrap_or(false);
            if !already_sent && self.session_manager.send(&session.id, &feedback).await.is_ok() {
                session.metadata.insert("reviewerFailureSentFor".to_string(), token);
            }
            session.metadata.insert("reviewerCycle".to_string(), (cycle + 1).to_string());
            return Some(SessionStatus::ReviewerFailed);
        }

        Some(SessionStatus::ReviewerPending)
    }

    async fn ensure_reviewers_spawned(&self, session: &mut Session, project: &Project, cycle: u32) {
        let spawned_cycle: u32 = session
            .metadata
            .get("reviewersSpawnedForCycle")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        if spawned_cycle >= cycle {
            return;
        }

        let k = self.config.reviewer.effective_reviewer_count();
        for reviewer_id in REVIEWER_ID_POOL.iter().take(k) {
            let prompt = format!(
                "Review the pull request opened for session {}. Post a PR comment containing \
                 AO_REVIEWER_ID={reviewer_id} AO_REVIEWER_VERDICT=<APPROVE|REJECT> \
                 AO_REVIEWER_CYCLE={cycle} AO_REVIEWER_EVIDENCE=<true|false>.",
                session.id
            );
            match self
                .session_manager
                .spawn(
                    &project.id,
                    SpawnRequest {
                        prompt: Some(prompt),
                        ..Default::default()
                    },
                )
                .await
            {
                Ok(mut reviewer_session) => {
                    reviewer_session.metadata.insert("role".to_string(), "reviewer".to_string());
                    reviewer_session
                        .metadata
                        .insert("reviewerId".to_string(), (*reviewer_id).to_string());
                    reviewer_session.metadata.insert("reviewerCycle".to_string(), cycle.to_string());
                    reviewer_session
                        .metadata
                        .insert("reviewerFor".to_string(), session.id.as_str().to_string());
                    if let Ok(fields) = metadata_codec::encode(&reviewer_session) {
                        let _ = self
                            .session_manager
                            .metadata_store()
                            .write(&reviewer_session.id, &fields);
                    }
                }
                Err(err) => warn!(%err, session = %session.id, "failed to spawn reviewer session"),
            }
        }
        session
            .metadata
            .insert("reviewersSpawnedForCycle".to_string(), cycle.to_string());
    }

    async fn escalate_reviewer_to_human(&self, session: &Session) {
        let event = Event::new(EventType::ReactionEscalated, session.id.clone())
            .with_detail(format!("reviewer cycle exceeded maxCycles for {}", session.id));
        self.notify_human(&event).await;
    }

    async fn record_transition(&self, session: &mut Session, old: SessionStatus, new: SessionStatus) {
        if let Err(err) =
            self.metrics
                .record_transition(&session.id, old.as_str(), new.as_str(), self.clock.now())
        {
            debug!(%err, session = %session.id, "failed to record outcome metric (best-effort)");
        }

        let Some(event_type) = EventType::for_target_status(new) else {
            return;
        };
        let event = Event::new(event_type, session.id.clone());
        self.dispatch_event(session, &event).await;
    }

    /// When status hasn't changed but a `send-to-agent` reaction still has an
    /// open escalation ladder (a prior send failed), keep driving it forward
    /// instead of waiting for the next real transition.
    async fn retry_pending_reaction(&self, session: &mut Session, status: SessionStatus) {
        let Some(event_type) = EventType::for_target_status(status) else {
            return;
        };
        let Some(reaction_key) = reaction_key_for(event_type) else {
            return;
        };
        let Some(cfg) = self.config.reactions.get(reaction_key).cloned() else {
            return;
        };
        if cfg.action != ReactionAction::SendToAgent || !cfg.should_execute() {
            return;
        }
        if self.escalation_states(session).contains_key(reaction_key) {
            self.run_send_to_agent(session, reaction_key, &cfg).await;
        }
    }

    async fn dispatch_event(&self, session: &mut Session, event: &Event) {
        let reaction_key = reaction_key_for(event.event_type);
        let cfg = reaction_key.and_then(|key| self.config.reactions.get(key).cloned());

        if let (Some(reaction_key), Some(cfg)) = (reaction_key, &cfg) {
            if cfg.should_execute() {
                match cfg.action {
                    ReactionAction::SendToAgent => {
                        self.run_send_to_agent(session, reaction_key, cfg).await;
                        return;
                    }
                    ReactionAction::Notify => {
                        self.notify_human(event).await;
                        return;
                    }
                    ReactionAction::AutoMerge => {
                        self.run_auto_merge(session).await;
                        return;
                    }
                }
            }
        }

        if event.priority != Priority::Info {
            self.notify_human(event).await;
        }
    }

    async fn run_send_to_agent(&self, session: &mut Session, reaction_key: &str, cfg: &ReactionConfig) {
        let mut states = self.escalation_states(session);
        let now = self.clock.now();
        let tick = begin_tick(&mut states, reaction_key, now, &cfg.escalation);

        if tick.should_send {
            let ctx = self.reaction_context(session).await;
            let message = cfg.message.clone().unwrap_or_else(|| build_message(reaction_key, &ctx));
            let success = self.session_manager.send(&session.id, &message).await.is_ok();
            let promotion = record_result(&mut states, reaction_key, now, &cfg.escalation, success);
            if let Some(transition) = tick.time_promotion.or(promotion) {
                self.on_escalation_transition(session, reaction_key, &transition).await;
            }
        } else if let Some(transition) = tick.time_promotion {
            self.on_escalation_transition(session, reaction_key, &transition).await;
        }

        self.save_escalation_states(session, states);
    }

    async fn on_escalation_transition(
        &self,
        session: &Session,
        reaction_key: &str,
        transition: &EscalationTransition,
    ) {
        info!(
            session = %session.id,
            reaction = reaction_key,
            from = ?transition.from,
            to = ?transition.to,
            reason = ?transition.reason,
            "escalation ladder promoted"
        );
        if transition.to == EscalationLevel::Human {
            let event = Event::new(EventType::ReactionEscalated, session.id.clone())
                .with_detail(format!("{reaction_key} escalated to human"));
            self.notify_human(&event).await;
        }
    }

    async fn run_auto_merge(&self, session: &Session) {
        let Some(project) = self.projects.get(&session.project_id) else { return };
        let Some(scm) = self.registry.scm_for(project) else { return };
        let Some(pr) = &session.pr else { return };
        if let Err(err) = scm.merge_pr(pr).await {
            debug!(%err, session = %session.id, "auto-merge failed, will retry next tick");
        }
    }

    async fn reaction_context(&self, session: &Session) -> ReactionContext {
        let mut ctx = ReactionContext::default();

        if let Some(project) = self.projects.get(&session.project_id) {
            if let Some(scm) = self.registry.scm_for(project) {
                if let Some(pr) = &session.pr {
                    if let Ok(checks) = scm.get_ci_checks(pr).await {
                        ctx.failing_checks = checks.into_iter().filter(|c| !c.passing).map(|c| c.name).collect();
                    }
                    if let Ok(comments) = scm.get_pending_comments(pr).await {
                        ctx.unresolved_comments = comments
                            .into_iter()
                            .filter(|c: &ReviewComment| !c.resolved)
                            .map(|c| c.body)
                            .collect();
                    }
                }
            }
        }

        if let Some(handle) = &session.runtime_handle {
            if let Ok(runtime) = self.registry.runtime(&handle.runtime_name) {
                if let Ok(output) = runtime.get_output(handle, OUTPUT_PROBE_LINES).await {
                    if !output.is_empty() {
                        ctx.recent_output = Some(output);
                    }
                }
            }
        }

        ctx
    }

    async fn notify_human(&self, event: &Event) {
        let Some(names) = self.config.notification_routing.get(&event.priority) else {
            return;
        };
        for notifier in self.registry.notifiers(names) {
            if let Err(err) = notifier.notify(event).await {
                debug!(%err, notifier = notifier.name(), "notifier failed, swallowing (spec.md §4.3.5)");
            }
        }
    }

    fn escalation_states(&self, session: &Session) -> EscalationStateMap {
        session
            .metadata
            .get("escalationState")
            .and_then(|raw| deserialize_escalation_map(raw).ok())
            .unwrap_or_default()
    }

    fn save_escalation_states(&self, session: &mut Session, states: EscalationStateMap) {
        if states.is_empty() {
            session.metadata.remove("escalationState");
            return;
        }
        match serialize_escalation_map(&states) {
            Ok(raw) => {
                session.metadata.insert("escalationState".to_string(), raw);
            }
            Err(err) => {
                debug!(%err, session = %session.id, "failed to serialize escalation state");
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Approve,
    Reject,
}

#[derive(Debug, Clone)]
struct ReviewerVerdict {
    id: String,
    verdict: Verdict,
    has_evidence: bool,
}

/// Pull `AO_REVIEWER_*=value` tokens out of a comment body. Tokens are
/// whitespace-separated, e.g. `AO_REVIEWER_ID=reviewer-a AO_REVIEWER_VERDICT=APPROVE`.
fn parse_markers(body: &str) -> BTreeMap<&str, &str> {
    let mut out = BTreeMap::new();
    for token in body.split_whitespace() {
        if let Some((key, value)) = token.split_once('=') {
            if key.starts_with("AO_REVIEWER_") {
                out.insert(key, value.trim_end_matches(|c: char| !c.is_alphanumeric() && c != '_'));
            }
        }
    }
    out
}

/// The latest verdict per reviewer id for the given cycle. `comments` is
/// oldest-first (spec.md §6 SCM contract), so a later comment from the same
/// reviewer overwrites an earlier one.
fn latest_verdicts_for_cycle(comments: &[ReviewComment], cycle: u32) -> BTreeMap<String, ReviewerVerdict> {
    let mut out: BTreeMap<String, ReviewerVerdict> = BTreeMap::new();
    for comment in comments {
        let markers = parse_markers(&comment.body);
        let Some(id) = markers.get("AO_REVIEWER_ID") else { continue };
        let Some(verdict_str) = markers.get("AO_REVIEWER_VERDICT") else { continue };
        let Some(comment_cycle) = markers.get("AO_REVIEWER_CYCLE").and_then(|s| s.parse::<u32>().ok()) else {
            continue;
        };
        if comment_cycle != cycle {
            continue;
        }
        let verdict = match *verdict_str {
            "APPROVE" => Verdict::Approve,
            "REJECT" => Verdict::Reject,
            _ => continue,
        };
        let has_evidence = markers.get("AO_REVIEWER_EVIDENCE").map(|v| *v == "true").unwrap_or(false);
        out.insert(
            id.to_string(),
            ReviewerVerdict {
                id: id.to_string(),
                verdict,
                has_evidence,
            },
        );
    }
    out
}

fn build_reviewer_feedback(verdicts: &BTreeMap<String, ReviewerVerdict>) -> String {
    let mut out = String::from("Reviewer feedback:\n");
    for v in verdicts.values() {
        if v.verdict == Verdict::Reject {
            out.push_str("  - ");
            out.push_str(&v.id);
            out.push_str(": changes requested\n");
        }
    }
    out
}

/// Render the typed evidence records (spec.md §4.5) into a plain-text
/// summary for the verifier prompt.
fn summarize_evidence(report: &evidence_parser::EvidenceReport) -> String {
    let mut out = String::from("Evidence summary:");
    if let Some(log) = report.command_log() {
        out.push_str(&format!("\n- commands run: {}", log.entries.len()));
        for entry in log.entries.iter().filter(|e| e.exit_code != 0) {
            out.push_str(&format!("\n  - FAILED `{}` (exit {})", entry.command, entry.exit_code));
        }
    }
    if let Some(tests) = report.tests_run() {
        let failed: Vec<&str> = tests
            .tests
            .iter()
            .filter(|t| !t.passed)
            .map(|t| t.name.as_str())
            .collect();
        out.push_str(&format!("\n- tests run: {} ({} failed)", tests.tests.len(), failed.len()));
        for name in failed {
            out.push_str(&format!("\n  - FAILED {name}"));
        }
    }
    if let Some(paths) = report.changed_paths() {
        out.push_str(&format!("\n- paths changed: {}", paths.paths.len()));
    }
    if let Some(risks) = report.known_risks() {
        for risk in &risks.risks {
            out.push_str(&format!("\n- known risk: {}", risk.description));
        }
    }
    out
}

#[cfg(test)]
#[path = "lifecycle_manager_tests.rs"]
mod tests;
