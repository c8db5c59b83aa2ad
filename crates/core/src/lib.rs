// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ao-core: data model shared across the agent orchestrator.
//!
//! This crate has no knowledge of runtimes, agents, workspaces, SCMs, or
//! trackers -- those are plugin contracts owned by `ao-adapters`. It only
//! defines the shapes that flow between them: sessions, statuses,
//! escalation state, evidence, events, and the error taxonomy.

pub mod clock;
pub mod error;
pub mod escalation;
pub mod event;
pub mod evidence;
pub mod id;
pub mod session;
pub mod time_fmt;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use error::OrchestratorError;
pub use escalation::{
    deserialize_escalation_map, serialize_escalation_map, EscalationLevel, EscalationStateMap,
    EscalationTransition, PromotionReason, ReactionEscalationState,
};
pub use event::{Event, EventType, Priority};
pub use evidence::{
    skeleton_json, ChangedPaths, CommandLog, CommandLogEntry, EvidenceCompleteness, EvidenceFileKind,
    FileStatus, KnownRiskEntry, KnownRisks, TestRunEntry, TestsRun, EVIDENCE_SCHEMA_VERSION,
};
pub use id::{smallest_unused, IdGen, ProjectId, SequentialIdGen, ShortId, UuidIdGen};
pub use session::{Activity, PrRecord, RuntimeHandle, Session, SessionId, SessionStatus};
pub use time_fmt::{format_elapsed, format_elapsed_ms};
