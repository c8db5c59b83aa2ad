// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent Orchestrator daemon (`aod`).
//!
//! Background process that owns the polling loop and drives `determineStatus`
//! for every tracked session. Concrete runtime/agent/workspace/SCM/tracker/
//! notifier plugins are out of scope (spec.md §1): this binary boots with
//! the built-in fakes so the loop can be exercised end to end locally. A
//! real deployment registers concrete plugins the same way through
//! `PluginRegistry` and otherwise reuses everything in this crate unchanged.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod config;
mod env;
mod orchestrator;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use ao_adapters::{
    FakeAgentPlugin, FakeNotifierPlugin, FakeRuntimePlugin, FakeScmPlugin, FakeTrackerPlugin,
    FakeWorkspacePlugin, PluginRegistry, Project,
};
use ao_core::{ProjectId, SystemClock};
use ao_engine::OrchestratorConfig;
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

use crate::config::{DaemonConfig, DaemonError};
use crate::orchestrator::Orchestrator;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("aod {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("aod {}", env!("CARGO_PKG_VERSION"));
                println!("Agent Orchestrator daemon - runs the polling loop that advances sessions.");
                println!();
                println!("USAGE:");
                println!("    aod");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: aod [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = DaemonConfig::load()?;
    std::fs::create_dir_all(&config.state_dir)?;
    let _log_guard = setup_logging(&config)?;

    let lock_file = match config.acquire_lock() {
        Ok(f) => f,
        Err(DaemonError::LockFailed(_)) => {
            let pid = std::fs::read_to_string(&config.lock_path).unwrap_or_default();
            eprintln!("aod is already running (pid: {})", pid.trim());
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    info!("starting agent orchestrator daemon");

    let registry = Arc::new(build_fake_registry());
    let projects = build_projects();
    let orchestrator_config = OrchestratorConfig::default();
    let orchestrator: Orchestrator<SystemClock> = Orchestrator::build(
        registry,
        projects,
        orchestrator_config,
        &config,
        SystemClock,
    );

    let handle = orchestrator.start();
    info!("polling loop started");
    println!("READY");

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down..."),
        _ = sigint.recv() => info!("received SIGINT, shutting down..."),
    }

    orchestrator.stop();
    let _ = handle.await;
    drop(lock_file);
    config.release_lock();
    info!("daemon stopped");
    Ok(())
}

/// Register the in-memory fake plugins under every slot so the loop has
/// something to dispatch to. Real deployments register concrete plugins
/// here instead (out of scope per spec.md §1).
fn build_fake_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.register_runtime(Arc::new(FakeRuntimePlugin::new("fake-runtime")));
    registry.register_workspace(Arc::new(FakeWorkspacePlugin::new("fake-workspace")));
    registry.register_agent(Arc::new(FakeAgentPlugin::new("fake-agent")));
    registry.register_scm(Arc::new(FakeScmPlugin::new("fake-scm")));
    registry.register_tracker(Arc::new(FakeTrackerPlugin::new("fake-tracker")));
    registry.register_notifier(Arc::new(FakeNotifierPlugin::new("fake-notifier")));
    registry.set_default_runtime("fake-runtime");
    registry.set_default_agent("fake-agent");
    registry
}

/// One demo project rooted at `AO_PROJECT_ROOT` (or the current directory),
/// since the YAML project/config loader is out of scope (spec.md §1).
fn build_projects() -> BTreeMap<ProjectId, Project> {
    let root = std::env::var("AO_PROJECT_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_default());
    let project = Project {
        id: ProjectId::new("local"),
        root,
        default_branch: "main".to_string(),
        has_tracker: false,
        has_scm: false,
    };
    [(project.id.clone(), project)].into_iter().collect()
}

fn setup_logging(config: &DaemonConfig) -> Result<tracing_appender::non_blocking::WorkerGuard, DaemonError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().ok_or(DaemonError::NoStateDir)?,
        config.log_path.file_name().ok_or(DaemonError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
