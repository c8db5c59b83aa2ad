// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixture for the end-to-end scenarios: a fully wired
//! `SessionManager` + `LifecycleManager` pair running against the six fake
//! plugins, the same way `crates/engine`'s own unit tests are built, just
//! assembled from outside the crate boundary.

use std::collections::BTreeMap;
use std::sync::Arc;

use ao_adapters::{
    FakeAgentPlugin, FakeNotifierPlugin, FakeRuntimePlugin, FakeScmPlugin, FakeTrackerPlugin,
    FakeWorkspacePlugin, PluginRegistry, Project,
};
use ao_core::{FakeClock, PrRecord, ProjectId};
use ao_engine::{LifecycleManager, OrchestratorConfig, SessionManager};
use ao_storage::{MetadataStore, OutcomeMetrics};

#[allow(dead_code)]
pub struct Harness {
    pub session_manager: Arc<SessionManager<FakeClock>>,
    pub lifecycle: LifecycleManager<FakeClock>,
    pub runtime: FakeRuntimePlugin,
    pub workspace: FakeWorkspacePlugin,
    pub agent: FakeAgentPlugin,
    pub scm: FakeScmPlugin,
    pub tracker: FakeTrackerPlugin,
    pub notifier: FakeNotifierPlugin,
    pub clock: FakeClock,
    pub project: Project,
    pub tmp: tempfile::TempDir,
}

/// Build a one-project harness. `project_id` becomes the session id prefix
/// (spec.md §8 scenario 1 expects `app-1`, so callers pass `"app"`).
pub fn harness(project_id: &str, has_scm: bool, has_tracker: bool, config: OrchestratorConfig) -> Harness {
    let mut registry = PluginRegistry::new();
    let runtime = FakeRuntimePlugin::new("fake-runtime");
    let workspace = FakeWorkspacePlugin::new("fake-workspace");
    let agent = FakeAgentPlugin::new("fake-agent");
    let scm = FakeScmPlugin::new("fake-scm");
    let tracker = FakeTrackerPlugin::new("fake-tracker");
    let notifier = FakeNotifierPlugin::new("fake-notifier");
    registry.register_runtime(Arc::new(runtime.clone()));
    registry.register_workspace(Arc::new(workspace.clone()));
    registry.register_agent(Arc::new(agent.clone()));
    registry.register_scm(Arc::new(scm.clone()));
    registry.register_tracker(Arc::new(tracker.clone()));
    registry.register_notifier(Arc::new(notifier.clone()));
    registry.set_default_runtime("fake-runtime");
    registry.set_default_agent("fake-agent");
    let registry = Arc::new(registry);

    let project = Project {
        id: ProjectId::new(project_id),
        root: std::path::PathBuf::from(format!("/repos/{project_id}")),
        default_branch: "main".to_string(),
        has_tracker,
        has_scm,
    };
    let projects: BTreeMap<ProjectId, Project> = [(project.id.clone(), project.clone())].into_iter().collect();

    let tmp = tempfile::tempdir().unwrap();
    let metadata = Arc::new(MetadataStore::new(tmp.path().join("sessions")));
    let metrics = OutcomeMetrics::new(tmp.path().join("metrics.jsonl"));
    let clock = FakeClock::new();

    let session_manager = Arc::new(SessionManager::new(
        registry.clone(),
        metadata,
        projects.clone(),
        config.clone(),
        clock.clone(),
    ));
    let lifecycle =
        LifecycleManager::new(session_manager.clone(), registry, projects, config, metrics, clock.clone());

    Harness {
        session_manager,
        lifecycle,
        runtime,
        workspace,
        agent,
        scm,
        tracker,
        notifier,
        clock,
        project,
        tmp,
    }
}

pub fn base_config() -> OrchestratorConfig {
    let mut config = OrchestratorConfig::default();
    config.default_runtime = "fake-runtime".to_string();
    config.default_agent = "fake-agent".to_string();
    config
}

pub fn pr(number: u64) -> PrRecord {
    PrRecord {
        number,
        url: format!("https://example.invalid/pr/{number}"),
        owner: "acme".to_string(),
        repo: "widgets".to_string(),
        head: "feat".to_string(),
        base: "main".to_string(),
        draft: false,
    }
}

/// Write four complete evidence artifacts under a real temp directory and
/// point `session_id`'s persisted `worktree` field at it --
/// `FakeWorkspacePlugin`'s synthetic `/fake-workspaces/...` paths aren't
/// real directories, and the evidence parser does real filesystem I/O.
pub fn give_complete_evidence(harness: &Harness, session_id: &ao_core::SessionId, evidence_root: &std::path::Path) {
    ao_engine::evidence_parser::write_skeletons(evidence_root, session_id).unwrap();
    for kind in ao_core::EvidenceFileKind::ALL {
        let path = ao_engine::evidence_parser::artifact_path(evidence_root, session_id, kind);
        std::fs::write(&path, r#"{"schemaVersion":"1","complete":true}"#).unwrap();
    }
    harness
        .session_manager
        .metadata_store()
        .update(
            session_id,
            &[("worktree".to_string(), evidence_root.to_string_lossy().into_owned())]
                .into_iter()
                .collect(),
        )
        .unwrap();
}
