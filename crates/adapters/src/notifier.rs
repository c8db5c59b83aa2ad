// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notifier plugin contract (spec.md §6): best-effort dispatch of human
//! notifications. Failures here are always swallowed by the caller
//! (spec.md §4.3.5) -- the trait itself still returns a `Result` so
//! implementations can log what went wrong before it's dropped.

use ao_core::Event;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("notify failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait NotifierPlugin: Send + Sync {
    fn name(&self) -> &str;

    async fn notify(&self, event: &Event) -> Result<(), NotifierError>;
}

#[cfg(any(test, feature = "test-support"))]
#[path = "notifier_fake.rs"]
pub mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeNotifierPlugin;
