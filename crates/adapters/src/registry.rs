// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plugin registry (spec.md §2, §9 "Plugin dispatch"): an in-memory map
//! from `(slot, name)` to a plugin instance.
//!
//! The registry is read-only after bootstrap (spec.md §5 "Shared
//! resources"): all registration happens during construction, then the
//! session manager and lifecycle manager only ever read from it.

use crate::{AgentPlugin, NotifierPlugin, RuntimePlugin, ScmPlugin, TrackerPlugin, WorkspacePlugin};
use ao_core::OrchestratorError;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One of the six plugin slots a project can configure (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PluginSlot {
    Runtime,
    Agent,
    Workspace,
    Scm,
    Tracker,
    Notifier,
}

impl PluginSlot {
    fn as_str(self) -> &'static str {
        match self {
            PluginSlot::Runtime => "runtime",
            PluginSlot::Agent => "agent",
            PluginSlot::Workspace => "workspace",
            PluginSlot::Scm => "scm",
            PluginSlot::Tracker => "tracker",
            PluginSlot::Notifier => "notifier",
        }
    }
}

/// In-memory `(slot, name) -> plugin instance` map. Built once at startup
/// from built-ins plus config-declared plugins (out of scope: the YAML
/// loader that drives registration); consumed read-only afterwards.
#[derive(Default)]
pub struct PluginRegistry {
    runtimes: BTreeMap<String, Arc<dyn RuntimePlugin>>,
    agents: BTreeMap<String, Arc<dyn AgentPlugin>>,
    workspaces: BTreeMap<String, Arc<dyn WorkspacePlugin>>,
    scms: BTreeMap<String, Arc<dyn ScmPlugin>>,
    trackers: BTreeMap<String, Arc<dyn TrackerPlugin>>,
    notifiers: BTreeMap<String, Arc<dyn NotifierPlugin>>,
    default_runtime: Option<String>,
    default_agent: Option<String>,
}

macro_rules! slot_accessors {
    ($register:ident, $get:ident, $field:ident, $trait:ty, $slot:expr) => {
        pub fn $register(&mut self, plugin: Arc<$trait>) {
            self.$field.insert(plugin.name().to_string(), plugin);
        }

        pub fn $get(&self, name: &str) -> Result<Arc<$trait>, OrchestratorError> {
            self.$field
                .get(name)
                .cloned()
                .ok_or_else(|| OrchestratorError::PluginNotFound {
                    slot: $slot.as_str().to_string(),
                    name: name.to_string(),
                })
        }
    };
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    slot_accessors!(register_runtime, runtime, runtimes, dyn RuntimePlugin, PluginSlot::Runtime);
    slot_accessors!(register_agent, agent, agents, dyn AgentPlugin, PluginSlot::Agent);
    slot_accessors!(
        register_workspace,
        workspace,
        workspaces,
        dyn WorkspacePlugin,
        PluginSlot::Workspace
    );
    slot_accessors!(register_scm, scm, scms, dyn ScmPlugin, PluginSlot::Scm);
    slot_accessors!(register_tracker, tracker, trackers, dyn TrackerPlugin, PluginSlot::Tracker);
    slot_accessors!(register_notifier, notifier, notifiers, dyn NotifierPlugin, PluginSlot::Notifier);

    /// Name used when a request doesn't pin a runtime/agent explicitly, and
    /// when `send` must synthesise a default handle (spec.md §4.2 `send`).
    pub fn set_default_runtime(&mut self, name: impl Into<String>) {
        self.default_runtime = Some(name.into());
    }

    pub fn set_default_agent(&mut self, name: impl Into<String>) {
        self.default_agent = Some(name.into());
    }

    pub fn default_runtime_name(&self) -> Result<&str, OrchestratorError> {
        self.default_runtime
            .as_deref()
            .ok_or_else(|| OrchestratorError::PluginNotFound {
                slot: PluginSlot::Runtime.as_str().to_string(),
                name: "<default>".to_string(),
            })
    }

    pub fn default_agent_name(&self) -> Result<&str, OrchestratorError> {
        self.default_agent
            .as_deref()
            .ok_or_else(|| OrchestratorError::PluginNotFound {
                slot: PluginSlot::Agent.as_str().to_string(),
                name: "<default>".to_string(),
            })
    }

    /// The one workspace plugin configured, if any (spec.md §4.2 `spawn`
    /// step 7: unlike SCM/tracker, workspace is not gated by a per-project
    /// flag -- every project that can spawn sessions needs one).
    pub fn any_workspace(&self) -> Option<Arc<dyn WorkspacePlugin>> {
        self.workspaces.values().next().cloned()
    }

    pub fn scm_for(&self, project: &crate::Project) -> Option<Arc<dyn ScmPlugin>> {
        if !project.has_scm {
            return None;
        }
        self.scms.values().next().cloned()
    }

    pub fn tracker_for(&self, project: &crate::Project) -> Option<Arc<dyn TrackerPlugin>> {
        if !project.has_tracker {
            return None;
        }
        self.trackers.values().next().cloned()
    }

    pub fn notifiers(&self, names: &[String]) -> Vec<Arc<dyn NotifierPlugin>> {
        names.iter().filter_map(|n| self.notifiers.get(n).cloned()).collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
