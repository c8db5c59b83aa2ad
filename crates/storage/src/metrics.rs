// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outcome metrics: an append-only transition log for retrospectives
//! (spec.md §2). One JSON object per line, one line per observed status
//! transition. Best-effort by design (spec.md §4.3.5): a write failure here
//! must never block a state update, so callers are expected to log and
//! swallow the error rather than propagate it.

use ao_core::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One recorded status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub session_id: SessionId,
    pub from: String,
    pub to: String,
    pub at: DateTime<Utc>,
}

/// Appends [`TransitionRecord`]s as JSONL to a single file. Never rewrites
/// or truncates existing entries.
pub struct OutcomeMetrics {
    path: PathBuf,
}

impl OutcomeMetrics {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn record_transition(
        &self,
        session_id: &SessionId,
        from: &str,
        to: &str,
        at: DateTime<Utc>,
    ) -> Result<(), MetricsError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let record = TransitionRecord {
            session_id: session_id.clone(),
            from: from.to_string(),
            to: to.to_string(),
            at,
        };
        let line = serde_json::to_string(&record)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(())
    }

    /// Read back all recorded transitions, in append order. Used by tests
    /// and by retrospective tooling, not by the hot path.
    pub fn read_all(&self) -> Result<Vec<TransitionRecord>, MetricsError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        content
            .lines()
            .filter(|l| !l.is_empty())
            .map(|l| serde_json::from_str(l).map_err(MetricsError::from))
            .collect()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
