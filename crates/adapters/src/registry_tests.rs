// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::{FakeAgentPlugin, FakeNotifierPlugin, FakeRuntimePlugin, FakeScmPlugin, FakeTrackerPlugin, FakeWorkspacePlugin};
use crate::Project;
use ao_core::ProjectId;
use std::sync::Arc;

fn project(has_tracker: bool, has_scm: bool) -> Project {
    Project {
        id: ProjectId::new("my-app"),
        root: "/repo".into(),
        default_branch: "main".into(),
        has_tracker,
        has_scm,
    }
}

#[test]
fn runtime_lookup_miss_is_plugin_not_found() {
    let registry = PluginRegistry::new();
    let err = registry.runtime("tmux").unwrap_err();
    assert!(matches!(err, ao_core::OrchestratorError::PluginNotFound { slot, name }
        if slot == "runtime" && name == "tmux"));
}

#[test]
fn registered_runtime_is_found_by_name() {
    let mut registry = PluginRegistry::new();
    registry.register_runtime(Arc::new(FakeRuntimePlugin::new("tmux")));
    let plugin = registry.runtime("tmux").unwrap();
    assert_eq!(plugin.name(), "tmux");
}

#[test]
fn all_six_slots_round_trip() {
    let mut registry = PluginRegistry::new();
    registry.register_runtime(Arc::new(FakeRuntimePlugin::new("tmux")));
    registry.register_agent(Arc::new(FakeAgentPlugin::default()));
    registry.register_workspace(Arc::new(FakeWorkspacePlugin::default()));
    registry.register_scm(Arc::new(FakeScmPlugin::new("github")));
    registry.register_tracker(Arc::new(FakeTrackerPlugin::new("linear")));
    registry.register_notifier(Arc::new(FakeNotifierPlugin::new("slack")));

    assert!(registry.runtime("tmux").is_ok());
    assert!(registry.agent("").is_ok());
    assert!(registry.workspace("").is_ok());
    assert!(registry.scm("github").is_ok());
    assert!(registry.tracker("linear").is_ok());
    assert!(registry.notifier("slack").is_ok());
}

#[test]
fn default_runtime_and_agent_require_explicit_set() {
    let registry = PluginRegistry::new();
    assert!(registry.default_runtime_name().is_err());
    assert!(registry.default_agent_name().is_err());

    let mut registry = PluginRegistry::new();
    registry.set_default_runtime("tmux");
    registry.set_default_agent("claude");
    assert_eq!(registry.default_runtime_name().unwrap(), "tmux");
    assert_eq!(registry.default_agent_name().unwrap(), "claude");
}

#[test]
fn scm_for_respects_project_flag() {
    let mut registry = PluginRegistry::new();
    registry.register_scm(Arc::new(FakeScmPlugin::new("github")));

    assert!(registry.scm_for(&project(false, false)).is_none());
    assert!(registry.scm_for(&project(false, true)).is_some());
}

#[test]
fn tracker_for_respects_project_flag() {
    let mut registry = PluginRegistry::new();
    registry.register_tracker(Arc::new(FakeTrackerPlugin::new("linear")));

    assert!(registry.tracker_for(&project(false, false)).is_none());
    assert!(registry.tracker_for(&project(true, false)).is_some());
}

#[test]
fn any_workspace_returns_none_until_one_is_registered() {
    let mut registry = PluginRegistry::new();
    assert!(registry.any_workspace().is_none());
    registry.register_workspace(Arc::new(FakeWorkspacePlugin::new("local")));
    assert_eq!(registry.any_workspace().unwrap().name(), "local");
}

#[test]
fn notifiers_filters_by_name_list() {
    let mut registry = PluginRegistry::new();
    registry.register_notifier(Arc::new(FakeNotifierPlugin::new("slack")));
    registry.register_notifier(Arc::new(FakeNotifierPlugin::new("email")));

    let chosen = registry.notifiers(&["slack".to_string(), "missing".to_string()]);
    assert_eq!(chosen.len(), 1);
    assert_eq!(chosen[0].name(), "slack");
}
