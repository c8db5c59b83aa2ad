// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ao-storage: durable, file-based persistence for the agent orchestrator.
//!
//! Three unindexed, plain-file stores, each O(its own size) per operation:
//! the session metadata store, the paths/IDs derivation, and the
//! outcome-metrics transition log. No database.

pub mod metadata;
pub mod metrics;
pub mod paths;

pub use metadata::{parse_kv, render_kv, MetadataError, MetadataStore};
pub use metrics::{MetricsError, OutcomeMetrics, TransitionRecord};
pub use paths::{archive_dir, hash12, is_valid_prefix, project_base_dir, sanitize_basename, sessions_dir};
