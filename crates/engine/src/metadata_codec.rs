// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Translation between a [`Session`] and the flat `key=value` fields the
//! metadata store persists (spec.md §4.1, §4.2 step 10).
//!
//! A fixed set of keys map onto `Session`'s own typed fields; everything
//! else round-trips verbatim into `Session::metadata` (spec.md §4.1
//! "unknown keys round-trip unchanged").

use crate::SessionError;
use ao_core::{PrRecord, ProjectId, RuntimeHandle, Session, SessionId, SessionStatus};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::str::FromStr;

const KEY_PROJECT: &str = "project";
const KEY_STATUS: &str = "status";
const KEY_BRANCH: &str = "branch";
const KEY_ISSUE: &str = "issue";
const KEY_WORKTREE: &str = "worktree";
const KEY_CREATED_AT: &str = "createdAt";
const KEY_LAST_ACTIVITY_AT: &str = "lastActivityAt";
const KEY_RESTORED_AT: &str = "restoredAt";
const KEY_RUNTIME_HANDLE: &str = "runtimeHandle";
const KEY_PR: &str = "pr";

fn is_known_key(key: &str) -> bool {
    matches!(
        key,
        KEY_PROJECT
            | KEY_STATUS
            | KEY_BRANCH
            | KEY_ISSUE
            | KEY_WORKTREE
            | KEY_CREATED_AT
            | KEY_LAST_ACTIVITY_AT
            | KEY_RESTORED_AT
            | KEY_RUNTIME_HANDLE
            | KEY_PR
    )
}

/// Render a `Session` into the flat fields written to disk. `activity` is
/// deliberately omitted -- it is re-derived by `list`/`get` on every read,
/// never persisted.
pub fn encode(session: &Session) -> Result<BTreeMap<String, String>, SessionError> {
    let mut fields = BTreeMap::new();
    fields.insert(KEY_PROJECT.to_string(), session.project_id.as_str().to_string());
    fields.insert(KEY_STATUS.to_string(), session.status.as_str().to_string());
    if let Some(branch) = &session.branch {
        fields.insert(KEY_BRANCH.to_string(), branch.clone());
    }
    if let Some(issue) = &session.issue_id {
        fields.insert(KEY_ISSUE.to_string(), issue.clone());
    }
    if let Some(worktree) = &session.workspace_path {
        fields.insert(KEY_WORKTREE.to_string(), worktree.clone());
    }
    fields.insert(KEY_CREATED_AT.to_string(), session.created_at.to_rfc3339());
    if let Some(t) = session.last_activity_at {
        fields.insert(KEY_LAST_ACTIVITY_AT.to_string(), t.to_rfc3339());
    }
    if let Some(t) = session.restored_at {
        fields.insert(KEY_RESTORED_AT.to_string(), t.to_rfc3339());
    }
    if let Some(handle) = &session.runtime_handle {
        fields.insert(KEY_RUNTIME_HANDLE.to_string(), serde_json::to_string(handle)?);
    }
    if let Some(pr) = &session.pr {
        fields.insert(KEY_PR.to_string(), serde_json::to_string(pr)?);
    }
    for (k, v) in &session.metadata {
        fields.insert(k.clone(), v.clone());
    }
    Ok(fields)
}

/// Reconstruct a `Session` from its on-disk fields. Malformed `createdAt`
/// falls back to the Unix epoch rather than failing the whole read --
/// timestamps are advisory, not safety-critical.
pub fn decode(id: &SessionId, fields: &BTreeMap<String, String>) -> Result<Session, SessionError> {
    let project_id = fields
        .get(KEY_PROJECT)
        .map(|s| ProjectId::new(s.clone()))
        .unwrap_or_else(|| ProjectId::new(""));
    let status = fields
        .get(KEY_STATUS)
        .and_then(|s| SessionStatus::from_str(s).ok())
        .unwrap_or(SessionStatus::Spawning);
    let branch = fields.get(KEY_BRANCH).cloned();
    let issue_id = fields.get(KEY_ISSUE).cloned();
    let workspace_path = fields.get(KEY_WORKTREE).cloned();
    let created_at = fields
        .get(KEY_CREATED_AT)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    let last_activity_at = fields
        .get(KEY_LAST_ACTIVITY_AT)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));
    let restored_at = fields
        .get(KEY_RESTORED_AT)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));
    let runtime_handle = fields
        .get(KEY_RUNTIME_HANDLE)
        .map(|s| serde_json::from_str::<RuntimeHandle>(s))
        .transpose()?;
    let pr = fields
        .get(KEY_PR)
        .map(|s| serde_json::from_str::<PrRecord>(s))
        .transpose()?;

    let metadata = fields
        .iter()
        .filter(|(k, _)| !is_known_key(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Ok(Session {
        id: id.clone(),
        project_id,
        status,
        activity: None,
        branch,
        issue_id,
        workspace_path,
        pr,
        runtime_handle,
        created_at,
        last_activity_at,
        restored_at,
        metadata,
    })
}

#[cfg(test)]
#[path = "metadata_codec_tests.rs"]
mod tests;
