// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker evidence artifact types (spec.md §3 "Worker Evidence", §6 file formats).
//!
//! Four JSON artifacts the agent writes into
//! `<workspacePath>/.ao/evidence/<sessionId>/`: `command-log.json`,
//! `tests-run.json`, `changed-paths.json`, `known-risks.json`. This module
//! owns the typed shape of each; `ao-engine::evidence_parser` owns reading
//! them off disk and aggregating completeness.

use serde::{Deserialize, Serialize};

pub const EVIDENCE_SCHEMA_VERSION: &str = "1";

/// Per-file classification before aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Missing,
    Invalid,
    Incomplete,
    Complete,
}

/// Aggregate classification across all four artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceCompleteness {
    Missing,
    Incomplete,
    Complete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandLogEntry {
    pub command: String,
    pub exit_code: i32,
    #[serde(default)]
    pub cwd: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandLog {
    pub schema_version: String,
    pub complete: bool,
    #[serde(default)]
    pub entries: Vec<CommandLogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunEntry {
    pub name: String,
    pub passed: bool,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestsRun {
    pub schema_version: String,
    pub complete: bool,
    #[serde(default)]
    pub tests: Vec<TestRunEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedPaths {
    pub schema_version: String,
    pub complete: bool,
    #[serde(default)]
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownRiskEntry {
    pub description: String,
    #[serde(default)]
    pub severity: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownRisks {
    pub schema_version: String,
    pub complete: bool,
    #[serde(default)]
    pub risks: Vec<KnownRiskEntry>,
}

/// An empty skeleton artifact, as `spawn` step 6 writes at session creation:
/// `schemaVersion=1`, `complete=false`.
pub fn skeleton_json(kind: EvidenceFileKind) -> serde_json::Value {
    let array_key = match kind {
        EvidenceFileKind::CommandLog => "entries",
        EvidenceFileKind::TestsRun => "tests",
        EvidenceFileKind::ChangedPaths => "paths",
        EvidenceFileKind::KnownRisks => "risks",
    };
    serde_json::json!({
        "schemaVersion": EVIDENCE_SCHEMA_VERSION,
        "complete": false,
        array_key: [],
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EvidenceFileKind {
    CommandLog,
    TestsRun,
    ChangedPaths,
    KnownRisks,
}

impl EvidenceFileKind {
    pub const ALL: [EvidenceFileKind; 4] = [
        EvidenceFileKind::CommandLog,
        EvidenceFileKind::TestsRun,
        EvidenceFileKind::ChangedPaths,
        EvidenceFileKind::KnownRisks,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            EvidenceFileKind::CommandLog => "command-log.json",
            EvidenceFileKind::TestsRun => "tests-run.json",
            EvidenceFileKind::ChangedPaths => "changed-paths.json",
            EvidenceFileKind::KnownRisks => "known-risks.json",
        }
    }
}

#[cfg(test)]
#[path = "evidence_tests.rs"]
mod tests;
