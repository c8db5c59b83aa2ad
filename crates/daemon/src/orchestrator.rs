// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wires a `PluginRegistry` to a `SessionManager` and a `LifecycleManager`
//! and exposes the operations a CLI or RPC layer (out of scope here) would
//! call: `spawn`, `send`, `kill`, `restore`, `cleanup`, `list`, plus
//! `start`/`stop` for the polling loop.

use std::collections::BTreeMap;
use std::sync::Arc;

use ao_adapters::{PluginRegistry, Project, SpawnRequest};
use ao_core::{Clock, ProjectId, Session, SessionId, SystemClock};
use ao_engine::{CleanupReport, LifecycleManager, OrchestratorConfig, SessionError, SessionManager};
use ao_storage::{MetadataStore, OutcomeMetrics};

use crate::config::DaemonConfig;
use crate::env;

/// The running orchestrator process, generic over `Clock` so tests can
/// drive it with a `FakeClock` the same way `ao-engine`'s own tests do.
pub struct Orchestrator<C: Clock = SystemClock> {
    session_manager: Arc<SessionManager<C>>,
    lifecycle: LifecycleManager<C>,
}

impl<C: Clock + 'static> Orchestrator<C> {
    /// Wire a fresh orchestrator from its plugin registry, the projects it
    /// serves, and the on-disk paths it should persist to.
    pub fn build(
        registry: Arc<PluginRegistry>,
        projects: BTreeMap<ProjectId, Project>,
        config: OrchestratorConfig,
        daemon_config: &DaemonConfig,
        clock: C,
    ) -> Self {
        let metadata = Arc::new(MetadataStore::new(daemon_config.sessions_dir.clone()));
        let metrics = OutcomeMetrics::new(daemon_config.metrics_path.clone());

        let session_manager = Arc::new(SessionManager::new(
            registry.clone(),
            metadata,
            projects.clone(),
            config.clone(),
            clock.clone(),
        ));

        let mut lifecycle =
            LifecycleManager::new(session_manager.clone(), registry, projects, config, metrics, clock);
        if let Some(interval) = env::poll_interval_ms() {
            lifecycle = lifecycle.with_poll_interval(interval);
        }
        if let Some(cap) = env::max_concurrency() {
            lifecycle = lifecycle.with_max_concurrency(cap);
        }

        Self { session_manager, lifecycle }
    }

    /// Spawn the background polling loop. The returned handle resolves once
    /// `stop` is called and the in-flight sweep (if any) finishes.
    pub fn start(&self) -> tokio::task::JoinHandle<()> {
        self.lifecycle.clone().spawn_polling_loop()
    }

    /// Signal the polling loop to stop after its current sweep.
    pub fn stop(&self) {
        self.lifecycle.request_stop();
    }

    pub async fn spawn(&self, project_id: &ProjectId, request: SpawnRequest) -> Result<Session, SessionError> {
        self.session_manager.spawn(project_id, request).await
    }

    pub async fn send(&self, id: &SessionId, message: &str) -> Result<(), SessionError> {
        self.session_manager.send(id, message).await
    }

    pub async fn kill(&self, id: &SessionId) -> Result<(), SessionError> {
        self.session_manager.kill(id).await
    }

    pub async fn restore(&self, id: &SessionId) -> Result<Session, SessionError> {
        self.session_manager.restore(id).await
    }

    pub async fn cleanup(&self, project_id: Option<&ProjectId>) -> Result<CleanupReport, SessionError> {
        self.session_manager.cleanup(project_id).await
    }

    pub async fn list(&self, project_id: Option<&ProjectId>) -> Result<Vec<Session>, SessionError> {
        self.session_manager.list(project_id).await
    }

    pub async fn get(&self, id: &SessionId) -> Result<Option<Session>, SessionError> {
        self.session_manager.get(id).await
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
