// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Evidence parser (spec.md §4.5): reads the four JSON artifacts a worker
//! writes under `<workspacePath>/.ao/evidence/<sessionId>/` and classifies
//! the bundle's completeness.

use ao_core::{
    ChangedPaths, CommandLog, EvidenceCompleteness, EvidenceFileKind, FileStatus, KnownRisks, SessionId, TestsRun,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// A file's domain-specific payload, extracted once it classifies as
/// complete (spec.md §4.5 "otherwise extract typed records").
#[derive(Debug, Clone)]
pub enum EvidenceRecord {
    CommandLog(CommandLog),
    TestsRun(TestsRun),
    ChangedPaths(ChangedPaths),
    KnownRisks(KnownRisks),
}

/// Per-bundle classification, with enough detail to drive the verifier gate
/// (status per file) and fingerprint-based re-verification avoidance.
#[derive(Debug, Clone)]
pub struct EvidenceReport {
    pub completeness: EvidenceCompleteness,
    pub file_status: BTreeMap<EvidenceFileKind, FileStatus>,
    /// Typed payload per file, present only for files that classified as
    /// `Complete` and whose domain-specific array deserialized cleanly.
    pub records: BTreeMap<EvidenceFileKind, EvidenceRecord>,
    /// `path:size:mtime` per file, joined with `|`; changes whenever any
    /// artifact is rewritten (spec.md §4.3.1 "evidence fingerprint").
    pub fingerprint: String,
}

impl EvidenceReport {
    pub fn is_complete(&self) -> bool {
        matches!(self.completeness, EvidenceCompleteness::Complete)
    }

    pub fn command_log(&self) -> Option<&CommandLog> {
        match self.records.get(&EvidenceFileKind::CommandLog) {
            Some(EvidenceRecord::CommandLog(log)) => Some(log),
            _ => None,
        }
    }

    pub fn tests_run(&self) -> Option<&TestsRun> {
        match self.records.get(&EvidenceFileKind::TestsRun) {
            Some(EvidenceRecord::TestsRun(tests)) => Some(tests),
            _ => None,
        }
    }

    pub fn changed_paths(&self) -> Option<&ChangedPaths> {
        match self.records.get(&EvidenceFileKind::ChangedPaths) {
            Some(EvidenceRecord::ChangedPaths(paths)) => Some(paths),
            _ => None,
        }
    }

    pub fn known_risks(&self) -> Option<&KnownRisks> {
        match self.records.get(&EvidenceFileKind::KnownRisks) {
            Some(EvidenceRecord::KnownRisks(risks)) => Some(risks),
            _ => None,
        }
    }
}

pub fn evidence_dir(workspace_path: &Path, session_id: &SessionId) -> PathBuf {
    workspace_path.join(".ao").join("evidence").join(session_id.as_str())
}

pub fn artifact_path(workspace_path: &Path, session_id: &SessionId, kind: EvidenceFileKind) -> PathBuf {
    evidence_dir(workspace_path, session_id).join(kind.file_name())
}

fn classify_file(path: &Path, kind: EvidenceFileKind) -> (FileStatus, String, Option<EvidenceRecord>) {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return (FileStatus::Missing, format!("{}:missing", path.display()), None),
    };
    let metadata = std::fs::metadata(path).ok();
    let size = metadata.as_ref().map(|m| m.len()).unwrap_or(0);
    let mtime = metadata
        .and_then(|m| m.modified().ok())
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let fingerprint_part = format!("{}:{}:{}", path.display(), size, mtime);

    match serde_json::from_str::<serde_json::Value>(&content) {
        Err(_) => (FileStatus::Invalid, fingerprint_part, None),
        Ok(value) => {
            let complete = value.get("complete").and_then(|v| v.as_bool()).unwrap_or(false);
            if !complete {
                return (FileStatus::Incomplete, fingerprint_part, None);
            }
            (FileStatus::Complete, fingerprint_part, parse_record(kind, &content))
        }
    }
}

/// Deserialize a complete artifact's domain-specific payload. A malformed
/// array doesn't revoke the file's `Complete` classification -- that was
/// already decided off the raw `complete` flag -- it just leaves the
/// record absent.
fn parse_record(kind: EvidenceFileKind, content: &str) -> Option<EvidenceRecord> {
    match kind {
        EvidenceFileKind::CommandLog => serde_json::from_str(content).ok().map(EvidenceRecord::CommandLog),
        EvidenceFileKind::TestsRun => serde_json::from_str(content).ok().map(EvidenceRecord::TestsRun),
        EvidenceFileKind::ChangedPaths => serde_json::from_str(content).ok().map(EvidenceRecord::ChangedPaths),
        EvidenceFileKind::KnownRisks => serde_json::from_str(content).ok().map(EvidenceRecord::KnownRisks),
    }
}

/// Parse all four artifacts for one session and aggregate.
pub fn parse(workspace_path: &Path, session_id: &SessionId) -> EvidenceReport {
    let mut file_status = BTreeMap::new();
    let mut records = BTreeMap::new();
    let mut fingerprint_parts = Vec::with_capacity(EvidenceFileKind::ALL.len());

    for kind in EvidenceFileKind::ALL {
        let path = artifact_path(workspace_path, session_id, kind);
        let (status, part, record) = classify_file(&path, kind);
        file_status.insert(kind, status);
        if let Some(record) = record {
            records.insert(kind, record);
        }
        fingerprint_parts.push(part);
    }

    let completeness = if file_status.values().all(|s| *s == FileStatus::Complete) {
        EvidenceCompleteness::Complete
    } else if file_status.values().all(|s| *s == FileStatus::Missing) {
        EvidenceCompleteness::Missing
    } else {
        EvidenceCompleteness::Incomplete
    };

    EvidenceReport {
        completeness,
        file_status,
        records,
        fingerprint: fingerprint_parts.join("|"),
    }
}

/// Write the four empty skeleton artifacts at session creation (spec.md §4.2
/// step 6): `schemaVersion=1`, `complete=false`.
pub fn write_skeletons(workspace_path: &Path, session_id: &SessionId) -> std::io::Result<()> {
    let dir = evidence_dir(workspace_path, session_id);
    std::fs::create_dir_all(&dir)?;
    for kind in EvidenceFileKind::ALL {
        let path = dir.join(kind.file_name());
        let value = ao_core::skeleton_json(kind);
        std::fs::write(&path, serde_json::to_string_pretty(&value)?)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "evidence_parser_tests.rs"]
mod tests;
