// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session manager (spec.md §4.2): creates and retires sessions, and is the
//! only component that calls runtime/agent/workspace plugins outside of the
//! lifecycle manager's polling loop.

use crate::config::OrchestratorConfig;
use crate::metadata_codec;
use ao_adapters::{
    LaunchConfig, PluginRegistry, PlanTask, Project, SpawnRequest, WorkspaceCreateRequest,
};
use ao_core::{smallest_unused, Clock, OrchestratorError, ProjectId, Session, SessionId, SessionStatus};
use ao_storage::MetadataStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::SessionError;

const EVIDENCE_SCHEMA_VERSION: &str = ao_core::EVIDENCE_SCHEMA_VERSION;

/// Result of a `cleanup` sweep (spec.md §4.2 `cleanup`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub killed: Vec<SessionId>,
    pub skipped: Vec<SessionId>,
}

/// Owns session creation/retirement and the durable metadata store.
/// Read-only bootstrap data (the plugin registry, configured projects) is
/// shared with the lifecycle manager via `Arc`.
pub struct SessionManager<C: Clock> {
    registry: Arc<PluginRegistry>,
    metadata: Arc<MetadataStore>,
    projects: BTreeMap<ProjectId, Project>,
    config: OrchestratorConfig,
    clock: C,
}

impl<C: Clock> SessionManager<C> {
    pub fn new(
        registry: Arc<PluginRegistry>,
        metadata: Arc<MetadataStore>,
        projects: BTreeMap<ProjectId, Project>,
        config: OrchestratorConfig,
        clock: C,
    ) -> Self {
        Self {
            registry,
            metadata,
            projects,
            config,
            clock,
        }
    }

    pub fn metadata_store(&self) -> &MetadataStore {
        &self.metadata
    }

    fn project(&self, project_id: &ProjectId) -> Result<&Project, SessionError> {
        self.projects
            .get(project_id)
            .ok_or_else(|| OrchestratorError::UnknownProject(project_id.as_str().to_string()).into())
    }

    /// `<prefix>-<N>` allocation (spec.md §4.2 step 4, determinism rules
    /// §4.2, §8 "Deterministic ID allocation"). The prefix is the project
    /// id itself -- the original's per-project configurable prefix comes
    /// from the out-of-scope YAML loader, so there is nothing else to key
    /// it from here.
    fn allocate_id(&self, project_id: &ProjectId) -> Result<SessionId, SessionError> {
        let prefix = project_id.as_str();
        let mut used = Vec::new();
        for id in self.metadata.list()? {
            if let Some(n) = parse_suffix(id.as_str(), prefix) {
                used.push(n);
            }
        }
        let archive_dir = self.metadata.sessions_dir().join("archive");
        if let Ok(entries) = std::fs::read_dir(&archive_dir) {
            for entry in entries.filter_map(|e| e.ok()) {
                let Some(name) = entry.file_name().to_str().map(|s| s.to_string()) else {
                    continue;
                };
                let archived_id = name.split('_').next().unwrap_or(&name);
                if let Some(n) = parse_suffix(archived_id, prefix) {
                    used.push(n);
                }
            }
        }
        let n = smallest_unused(prefix, used);
        Ok(SessionId::new(format!("{prefix}-{n}")))
    }

    fn default_environment(&self, cfg: &LaunchConfig) -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();
        env.insert("AO_SESSION_ID".to_string(), cfg.session_id.as_str().to_string());
        env.insert("AO_PROJECT_ID".to_string(), cfg.project_id.as_str().to_string());
        if let Some(issue_id) = &cfg.issue_id {
            env.insert("AO_ISSUE_ID".to_string(), issue_id.clone());
        }
        env.insert(
            "AO_EVIDENCE_DIR".to_string(),
            cfg.evidence_dir.to_string_lossy().into_owned(),
        );
        env.insert("AO_EVIDENCE_SCHEMA_VERSION".to_string(), EVIDENCE_SCHEMA_VERSION.to_string());
        env.insert(
            "AO_DATA_DIR".to_string(),
            self.metadata.sessions_dir().to_string_lossy().into_owned(),
        );
        env
    }

    /// spec.md §4.2 `spawn`.
    #[instrument(skip(self, request), fields(project = %project_id))]
    pub async fn spawn(&self, project_id: &ProjectId, request: SpawnRequest) -> Result<Session, SessionError> {
        let project = self.project(project_id)?.clone();

        if self.config.spawn.require_validated_plan_task {
            let valid = matches!(&request.plan_task, Some(PlanTask { validated: true, .. }));
            if !valid {
                return Err(OrchestratorError::PolicyViolation(
                    "spawn requires a validated plan task".to_string(),
                )
                .into());
            }
        }

        let mut issue = None;
        if let (Some(issue_id), true) = (&request.issue_id, project.has_tracker) {
            if let Some(tracker) = self.registry.tracker_for(&project) {
                match tracker.get_issue(issue_id, &project).await {
                    Ok(found) => issue = Some(found),
                    Err(ao_adapters::TrackerError::IssueNotFound(_)) => {}
                    Err(other) => return Err(OrchestratorError::TrackerAuthFailure(other.to_string()).into()),
                }
            }
        }

        let id = self.allocate_id(project_id)?;

        let tracker = self.registry.tracker_for(&project);
        let branch = request.branch.clone().unwrap_or_else(|| {
            if let (Some(tracker), Some(issue_id)) = (&tracker, &request.issue_id) {
                if let Some(name) = tracker.branch_name(issue_id, &project) {
                    return name;
                }
            }
            match &request.issue_id {
                Some(issue_id) => format!("feat/{issue_id}"),
                None => format!("session/{}", id.as_str()),
            }
        });

        let acceptance_contract = issue
            .as_ref()
            .zip(tracker.as_ref())
            .and_then(|(issue, tracker)| tracker.acceptance_contract(issue, &project));

        let workspace = self
            .registry
            .any_workspace()
            .ok_or_else(|| OrchestratorError::PluginNotFound {
                slot: "workspace".to_string(),
                name: "<any>".to_string(),
            })?;
        let workspace_req = WorkspaceCreateRequest {
            project_id: project_id.clone(),
            session_id: id.clone(),
            branch: branch.clone(),
            project: project.clone(),
        };
        let workspace_info = workspace.create(&workspace_req).await?;

        // The evidence directory lives under the workspace path, so it can
        // only be created once the workspace exists.
        crate::evidence_parser::write_skeletons(&workspace_info.path, &id)
            .map_err(|e| OrchestratorError::Plugin(format!("failed writing evidence skeletons: {e}")))?;
        let evidence_dir = crate::evidence_parser::evidence_dir(&workspace_info.path, &id);

        let mut cfg = LaunchConfig {
            session_id: id.clone(),
            project_id: project_id.clone(),
            workspace_path: workspace_info.path.clone(),
            branch: branch.clone(),
            issue_id: request.issue_id.clone(),
            prompt: request.prompt.clone(),
            acceptance_contract,
            environment: BTreeMap::new(),
            evidence_dir,
            launch_command: None,
        };
        cfg.environment = self.default_environment(&cfg);

        let agent_name = request
            .agent
            .clone()
            .unwrap_or_else(|| self.config.default_agent.clone());
        let agent = match self.registry.agent(&agent_name) {
            Ok(agent) => agent,
            Err(err) => {
                self.best_effort_teardown(&workspace, &workspace_info.path).await;
                return Err(err.into());
            }
        };

        let agent_env = match agent.get_environment(&cfg).await {
            Ok(env) => env,
            Err(err) => {
                self.best_effort_teardown(&workspace, &workspace_info.path).await;
                return Err(err.into());
            }
        };
        cfg.environment.extend(agent_env);

        let launch_command = match agent.get_launch_command(&cfg).await {
            Ok(command) => command,
            Err(err) => {
                self.best_effort_teardown(&workspace, &workspace_info.path).await;
                return Err(err.into());
            }
        };
        cfg.launch_command = Some(launch_command);

        let runtime_name = request
            .runtime
            .clone()
            .unwrap_or_else(|| self.config.default_runtime.clone());
        let runtime = match self.registry.runtime(&runtime_name) {
            Ok(runtime) => runtime,
            Err(err) => {
                self.best_effort_teardown(&workspace, &workspace_info.path).await;
                return Err(err.into());
            }
        };
        let runtime_handle = match runtime.create(&cfg).await {
            Ok(handle) => handle,
            Err(err) => {
                self.best_effort_teardown(&workspace, &workspace_info.path).await;
                return Err(err.into());
            }
        };

        let now = self.clock.now();
        let mut metadata = BTreeMap::new();
        if let Some(plan_task) = &request.plan_task {
            metadata.insert("planId".to_string(), plan_task.plan_id.clone());
            metadata.insert("planTaskId".to_string(), plan_task.task_id.clone());
            metadata.insert("planTaskValidated".to_string(), plan_task.validated.to_string());
        }
        metadata.insert("agent".to_string(), agent_name);

        let session = Session {
            id: id.clone(),
            project_id: project_id.clone(),
            status: SessionStatus::Spawning,
            activity: None,
            branch: Some(branch),
            issue_id: request.issue_id.clone(),
            workspace_path: Some(workspace_info.path.to_string_lossy().into_owned()),
            pr: None,
            runtime_handle: Some(runtime_handle),
            created_at: now,
            last_activity_at: None,
            restored_at: None,
            metadata,
        };

        let fields = metadata_codec::encode(&session)?;
        self.metadata.write(&session.id, &fields)?;
        info!(session = %session.id, "spawned session");
        Ok(session)
    }

    /// spec.md §4.2 `spawnOrchestrator`.
    #[instrument(skip(self, system_prompt), fields(project = %project_id))]
    pub async fn spawn_orchestrator(
        &self,
        project_id: &ProjectId,
        system_prompt: Option<String>,
    ) -> Result<Session, SessionError> {
        let project = self.project(project_id)?.clone();
        let id = SessionId::new(format!("{}-orchestrator", project_id.as_str()));

        let prompt = match system_prompt {
            Some(text) => {
                let path = project.root.join("orchestrator-prompt.md");
                std::fs::write(&path, &text)
                    .map_err(|e| OrchestratorError::Plugin(format!("writing orchestrator prompt: {e}")))?;
                Some(path.to_string_lossy().into_owned())
            }
            None => None,
        };

        crate::evidence_parser::write_skeletons(&project.root, &id)
            .map_err(|e| OrchestratorError::Plugin(format!("failed writing evidence skeletons: {e}")))?;
        let evidence_dir = crate::evidence_parser::evidence_dir(&project.root, &id);

        let mut cfg = LaunchConfig {
            session_id: id.clone(),
            project_id: project_id.clone(),
            workspace_path: project.root.clone(),
            branch: project.default_branch.clone(),
            issue_id: None,
            prompt,
            acceptance_contract: None,
            environment: BTreeMap::new(),
            evidence_dir,
            launch_command: None,
        };
        cfg.environment = self.default_environment(&cfg);

        let agent = self.registry.agent(&self.config.default_agent)?;
        let agent_env = agent.get_environment(&cfg).await?;
        cfg.environment.extend(agent_env);
        cfg.launch_command = Some(agent.get_launch_command(&cfg).await?);

        let runtime = self.registry.runtime(&self.config.default_runtime)?;
        let runtime_handle = runtime.create(&cfg).await?;

        let now = self.clock.now();
        let mut metadata = BTreeMap::new();
        metadata.insert("role".to_string(), "orchestrator".to_string());
        metadata.insert("agent".to_string(), self.config.default_agent.clone());

        let session = Session {
            id: id.clone(),
            project_id: project_id.clone(),
            status: SessionStatus::Spawning,
            activity: None,
            branch: Some(project.default_branch.clone()),
            issue_id: None,
            workspace_path: Some(project.root.to_string_lossy().into_owned()),
            pr: None,
            runtime_handle: Some(runtime_handle),
            created_at: now,
            last_activity_at: None,
            restored_at: None,
            metadata,
        };

        let fields = metadata_codec::encode(&session)?;
        self.metadata.write(&session.id, &fields)?;
        info!(session = %session.id, "spawned orchestrator session");
        Ok(session)
    }

    async fn best_effort_teardown(&self, workspace: &Arc<dyn ao_adapters::WorkspacePlugin>, path: &std::path::Path) {
        if let Err(err) = workspace.destroy(path).await {
            warn!(%err, "best-effort workspace teardown failed after partial spawn");
        }
    }

    /// spec.md §4.2 `list`: resolve runtime liveness and agent activity for
    /// every stored session. Plugin probe failures leave `activity` absent
    /// rather than failing the whole listing.
    #[instrument(skip(self))]
    pub async fn list(&self, project_id: Option<&ProjectId>) -> Result<Vec<Session>, SessionError> {
        let mut sessions = Vec::new();
        for id in self.metadata.list()? {
            if let Some(mut session) = self.load(&id)? {
                if let Some(project_id) = project_id {
                    if &session.project_id != project_id {
                        continue;
                    }
                }
                self.project_activity(&mut session).await;
                sessions.push(session);
            }
        }
        Ok(sessions)
    }

    /// spec.md §4.2 `get`.
    pub async fn get(&self, id: &SessionId) -> Result<Option<Session>, SessionError> {
        let Some(mut session) = self.load(id)? else {
            return Ok(None);
        };
        self.project_activity(&mut session).await;
        Ok(Some(session))
    }

    fn load(&self, id: &SessionId) -> Result<Option<Session>, SessionError> {
        let Some(fields) = self.metadata.read(id)? else {
            return Ok(None);
        };
        Ok(Some(metadata_codec::decode(id, &fields)?))
    }

    /// Runtime liveness + agent activity projection shared by `list`/`get`.
    async fn project_activity(&self, session: &mut Session) {
        let Some(handle) = session.runtime_handle.clone() else {
            return;
        };
        let Ok(runtime) = self.registry.runtime(&handle.runtime_name) else {
            return;
        };
        match runtime.is_alive(&handle).await {
            Ok(false) => {
                session.status = SessionStatus::Killed;
                session.activity = Some(ao_core::Activity::Exited);
                return;
            }
            Ok(true) => {}
            Err(_) => return,
        }

        let Some(agent_name) = self.session_agent_name(session) else {
            return;
        };
        let Ok(agent) = self.registry.agent(&agent_name) else {
            return;
        };
        match agent.get_activity_state(session).await {
            Ok(Some(activity)) => session.activity = Some(activity),
            Ok(None) | Err(_) => {}
        }
    }

    fn session_agent_name(&self, session: &Session) -> Option<String> {
        session.metadata.get("agent").cloned()
    }

    /// spec.md §4.2 `kill`: best-effort teardown, archive always attempted.
    #[instrument(skip(self))]
    pub async fn kill(&self, id: &SessionId) -> Result<(), SessionError> {
        let Some(session) = self.load(id)? else {
            return Err(OrchestratorError::SessionNotFound(id.as_str().to_string()).into());
        };

        if let Some(handle) = &session.runtime_handle {
            if let Ok(runtime) = self.registry.runtime(&handle.runtime_name) {
                if let Err(err) = runtime.destroy(handle).await {
                    debug!(%err, session = %id, "best-effort runtime destroy failed during kill");
                }
            }
        }
        if let Some(path) = &session.workspace_path {
            if let Some(workspace) = self.registry.any_workspace() {
                if let Err(err) = workspace.destroy(std::path::Path::new(path)).await {
                    debug!(%err, session = %id, "best-effort workspace destroy failed during kill");
                }
            }
        }

        self.metadata.archive(id, self.clock.now())?;
        info!(session = %id, "killed session");
        Ok(())
    }

    /// spec.md §4.2 `send`.
    #[instrument(skip(self, message))]
    pub async fn send(&self, id: &SessionId, message: &str) -> Result<(), SessionError> {
        let Some(session) = self.load(id)? else {
            return Err(OrchestratorError::SessionNotFound(id.as_str().to_string()).into());
        };
        let handle = match session.runtime_handle {
            Some(handle) => handle,
            None => ao_core::RuntimeHandle::new(id.as_str(), self.config.default_runtime.clone()),
        };
        let runtime = self.registry.runtime(&handle.runtime_name)?;
        runtime.send_message(&handle, message).await?;
        Ok(())
    }

    /// spec.md §4.2 `restore`.
    #[instrument(skip(self))]
    pub async fn restore(&self, id: &SessionId) -> Result<Session, SessionError> {
        let fields = match self.metadata.read(id)? {
            Some(fields) => fields,
            None => self
                .metadata
                .restore_from_archive(id)
                .map_err(|_| OrchestratorError::SessionNotFound(id.as_str().to_string()))?,
        };
        let session = metadata_codec::decode(id, &fields)?;

        if !session.status.is_restorable() {
            return Err(OrchestratorError::SessionNotRestorable {
                id: id.as_str().to_string(),
                status: session.status.as_str().to_string(),
            }
            .into());
        }

        let project = self.project(&session.project_id)?.clone();
        let workspace_path = session
            .workspace_path
            .clone()
            .map(std::path::PathBuf::from)
            .unwrap_or_else(|| project.root.clone());

        let workspace = self
            .registry
            .any_workspace()
            .ok_or_else(|| OrchestratorError::PluginNotFound {
                slot: "workspace".to_string(),
                name: "<any>".to_string(),
            })?;
        if !workspace.exists(&workspace_path).await.unwrap_or(false) {
            let req = WorkspaceCreateRequest {
                project_id: session.project_id.clone(),
                session_id: id.clone(),
                branch: session.branch.clone().unwrap_or_default(),
                project: project.clone(),
            };
            match workspace.restore(&req).await? {
                Some(_) => {}
                None => return Err(OrchestratorError::WorkspaceMissing(id.as_str().to_string()).into()),
            }
        }

        if let Some(old_handle) = &session.runtime_handle {
            if let Ok(runtime) = self.registry.runtime(&old_handle.runtime_name) {
                let _ = runtime.destroy(old_handle).await;
            }
        }

        let agent_name = session
            .metadata
            .get("agent")
            .cloned()
            .unwrap_or_else(|| self.config.default_agent.clone());
        let agent = self.registry.agent(&agent_name)?;

        let evidence_dir = crate::evidence_parser::evidence_dir(&workspace_path, id);
        let mut cfg = LaunchConfig {
            session_id: id.clone(),
            project_id: session.project_id.clone(),
            workspace_path: workspace_path.clone(),
            branch: session.branch.clone().unwrap_or_default(),
            issue_id: session.issue_id.clone(),
            prompt: None,
            acceptance_contract: None,
            environment: BTreeMap::new(),
            evidence_dir,
            launch_command: None,
        };
        cfg.environment = self.default_environment(&cfg);
        cfg.environment.extend(agent.get_environment(&cfg).await?);

        let command = match agent.get_restore_command(&cfg).await? {
            Some(command) => command,
            None => agent.get_launch_command(&cfg).await?,
        };
        cfg.launch_command = Some(command);

        let runtime_name = session
            .runtime_handle
            .as_ref()
            .map(|h| h.runtime_name.clone())
            .unwrap_or_else(|| self.config.default_runtime.clone());
        let runtime = self.registry.runtime(&runtime_name)?;
        let new_handle = runtime.create(&cfg).await?;

        let now = self.clock.now();
        let mut restored = session;
        restored.status = SessionStatus::Spawning;
        restored.restored_at = Some(now);
        restored.runtime_handle = Some(new_handle);

        let fields = metadata_codec::encode(&restored)?;
        self.metadata.write(id, &fields)?;
        info!(session = %id, "restored session");
        Ok(restored)
    }

    /// spec.md §4.2 `cleanup`.
    #[instrument(skip(self))]
    pub async fn cleanup(&self, project_id: Option<&ProjectId>) -> Result<CleanupReport, SessionError> {
        let mut report = CleanupReport::default();
        for session in self.list(project_id).await? {
            let runtime_dead = matches!(session.status, SessionStatus::Killed);
            let pr_merged = session.pr.is_some() && session.status == SessionStatus::Merged;
            let issue_completed = self.issue_completed(&session).await;

            if runtime_dead || pr_merged || issue_completed {
                match self.kill(&session.id).await {
                    Ok(()) => report.killed.push(session.id),
                    Err(_) => report.skipped.push(session.id),
                }
            } else {
                report.skipped.push(session.id);
            }
        }
        Ok(report)
    }

    /// "whose issue is completed" (spec.md §4.2 `cleanup`): asks the
    /// tracker, not a cached flag. Any lookup failure just leaves the
    /// criterion false for that session rather than failing the sweep.
    async fn issue_completed(&self, session: &Session) -> bool {
        let Some(issue_id) = &session.issue_id else {
            return false;
        };
        let Ok(project) = self.project(&session.project_id) else {
            return false;
        };
        let Some(tracker) = self.registry.tracker_for(project) else {
            return false;
        };
        match tracker.get_issue(issue_id, project).await {
            Ok(issue) => tracker.is_completed(&issue),
            Err(err) => {
                debug!(%err, session = %session.id, "tracker lookup failed during cleanup");
                false
            }
        }
    }
}

/// Parse the numeric suffix of `<prefix>-<N>`, `None` for anything else
/// (including the fixed `<prefix>-orchestrator` id).
fn parse_suffix(id: &str, prefix: &str) -> Option<u64> {
    let rest = id.strip_prefix(prefix)?.strip_prefix('-')?;
    rest.parse::<u64>().ok()
}

#[cfg(test)]
#[path = "session_manager_tests.rs"]
mod tests;
