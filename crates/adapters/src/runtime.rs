// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime plugin contract (spec.md §6): owns the agent process.
//!
//! Concrete runtimes (a real tmux attach, a real container runtime) are out
//! of scope here; see `fakes::FakeRuntimePlugin` for the test double.

use crate::LaunchConfig;
use async_trait::async_trait;
use ao_core::RuntimeHandle;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime create failed: {0}")]
    CreateFailed(String),
    #[error("handle not found: {0}")]
    HandleNotFound(String),
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("probe failed: {0}")]
    ProbeFailed(String),
}

#[async_trait]
pub trait RuntimePlugin: Send + Sync {
    fn name(&self) -> &str;

    async fn create(&self, cfg: &LaunchConfig) -> Result<RuntimeHandle, RuntimeError>;

    async fn destroy(&self, handle: &RuntimeHandle) -> Result<(), RuntimeError>;

    async fn send_message(&self, handle: &RuntimeHandle, text: &str) -> Result<(), RuntimeError>;

    /// Read up to `lines` of recent terminal output. An empty string means
    /// the probe itself failed (no process output), distinct from the
    /// process having exited cleanly -- callers must not conflate the two
    /// (spec.md §4.3 "Agent activity").
    async fn get_output(&self, handle: &RuntimeHandle, lines: usize) -> Result<String, RuntimeError>;

    async fn is_alive(&self, handle: &RuntimeHandle) -> Result<bool, RuntimeError>;
}

#[cfg(any(test, feature = "test-support"))]
#[path = "runtime_fake.rs"]
pub mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRuntimePlugin, RuntimeCall};
