// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ao-daemon: the orchestrator process (spec.md §2 "Daemon / process").
//!
//! Wires a `PluginRegistry` to a `SessionManager` and a `LifecycleManager`
//! (`orchestrator`), resolves on-disk paths and the exclusive-instance lock
//! (`config`, `env`), and ships a minimal binary (`main.rs`) that boots the
//! loop with the built-in fake plugins for local smoke-testing. The
//! concrete wire protocol, the dashboard, and notifier transports are out
//! of scope and not implemented here.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod env;
pub mod orchestrator;

pub use config::{DaemonConfig, DaemonError};
pub use orchestrator::Orchestrator;
