// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The session metadata store (spec.md §4.1).
//!
//! Each session is one small `key=value` text file at
//! `<sessions_dir>/<id>`. Mutation is always write-to-temp-then-rename, the
//! same durability idiom used elsewhere in this codebase for snapshots: a
//! crash mid-write leaves the previous file intact rather than a torn one.

use ao_core::SessionId;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no archive entries found for session {0}")]
    NoArchiveEntry(String),
}

impl MetadataError {
    fn io(path: &Path, source: io::Error) -> Self {
        MetadataError::Io {
            path: path.to_owned(),
            source,
        }
    }
}

/// Parse `key=value\n` lines. Empty lines are ignored. `=` at its first
/// occurrence splits key from value; values are opaque (no escaping).
pub fn parse_kv(text: &str) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    for line in text.lines() {
        if line.is_empty() {
            continue;
        }
        if let Some(idx) = line.find('=') {
            let key = &line[..idx];
            let value = &line[idx + 1..];
            fields.insert(key.to_string(), value.to_string());
        }
    }
    fields
}

pub fn render_kv(fields: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (k, v) in fields {
        out.push_str(k);
        out.push('=');
        out.push_str(v);
        out.push('\n');
    }
    out
}

/// Durable, file-based store of per-session metadata. `sessions_dir` is
/// derived from [`crate::paths`] so that projects stay isolated on disk.
pub struct MetadataStore {
    sessions_dir: PathBuf,
}

impl MetadataStore {
    pub fn new(sessions_dir: impl Into<PathBuf>) -> Self {
        Self {
            sessions_dir: sessions_dir.into(),
        }
    }

    pub fn sessions_dir(&self) -> &Path {
        &self.sessions_dir
    }

    fn archive_dir(&self) -> PathBuf {
        self.sessions_dir.join("archive")
    }

    fn active_path(&self, id: &SessionId) -> PathBuf {
        self.sessions_dir.join(id.as_str())
    }

    fn ensure_dirs(&self) -> Result<(), MetadataError> {
        fs::create_dir_all(&self.sessions_dir).map_err(|e| MetadataError::io(&self.sessions_dir, e))?;
        let archive = self.archive_dir();
        fs::create_dir_all(&archive).map_err(|e| MetadataError::io(&archive, e))
    }

    /// Replace the file atomically: write to `<id>.tmp`, fsync, rename.
    pub fn write(&self, id: &SessionId, fields: &BTreeMap<String, String>) -> Result<(), MetadataError> {
        self.ensure_dirs()?;
        let path = self.active_path(id);
        let tmp_path = self.sessions_dir.join(format!("{}.tmp", id.as_str()));
        let content = render_kv(fields);
        {
            let file = fs::File::create(&tmp_path).map_err(|e| MetadataError::io(&tmp_path, e))?;
            use io::Write;
            let mut writer = io::BufWriter::new(&file);
            writer
                .write_all(content.as_bytes())
                .map_err(|e| MetadataError::io(&tmp_path, e))?;
            writer.flush().map_err(|e| MetadataError::io(&tmp_path, e))?;
            file.sync_all().map_err(|e| MetadataError::io(&tmp_path, e))?;
        }
        fs::rename(&tmp_path, &path).map_err(|e| MetadataError::io(&path, e))?;
        Ok(())
    }

    /// Load all fields; `None` if the session has no active metadata file.
    pub fn read(&self, id: &SessionId) -> Result<Option<BTreeMap<String, String>>, MetadataError> {
        let path = self.active_path(id);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(parse_kv(&content))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MetadataError::io(&path, e)),
        }
    }

    /// Read-merge-write atomically. An empty string value deletes the key.
    /// Returns the fields as they exist after the merge.
    pub fn update(
        &self,
        id: &SessionId,
        fields: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>, MetadataError> {
        let mut current = self.read(id)?.unwrap_or_default();
        for (k, v) in fields {
            if v.is_empty() {
                current.remove(k);
            } else {
                current.insert(k.clone(), v.clone());
            }
        }
        self.write(id, &current)?;
        Ok(current)
    }

    /// Move the active file into `archive/<id>_<iso-timestamp-with-colons-replaced>`.
    /// No-op (but not an error) if there is no active file to archive.
    pub fn archive(&self, id: &SessionId, now: chrono::DateTime<chrono::Utc>) -> Result<(), MetadataError> {
        self.ensure_dirs()?;
        let path = self.active_path(id);
        if !path.exists() {
            debug!(session = %id, "archive: no active metadata file, nothing to do");
            return Ok(());
        }
        let stamp = now.to_rfc3339().replace(':', "-");
        let archive_path = self.archive_dir().join(format!("{}_{}", id.as_str(), stamp));
        fs::rename(&path, &archive_path).map_err(|e| MetadataError::io(&archive_path, e))?;
        Ok(())
    }

    /// Select the lexicographically greatest archive entry for `<id>_*` and
    /// copy it to the active slot (the archive entry itself is left in place).
    pub fn restore_from_archive(&self, id: &SessionId) -> Result<BTreeMap<String, String>, MetadataError> {
        let archive_dir = self.archive_dir();
        let prefix = format!("{}_", id.as_str());
        let mut candidates: Vec<PathBuf> = match fs::read_dir(&archive_dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(&prefix))
                })
                .collect(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(MetadataError::io(&archive_dir, e)),
        };
        candidates.sort();
        let Some(latest) = candidates.pop() else {
            return Err(MetadataError::NoArchiveEntry(id.as_str().to_string()));
        };
        let content = fs::read_to_string(&latest).map_err(|e| MetadataError::io(&latest, e))?;
        let fields = parse_kv(&content);
        self.write(id, &fields)?;
        Ok(fields)
    }

    /// Non-hidden regular files directly under `sessions_dir`, excluding the
    /// `archive/` directory and `*.tmp` leftovers.
    pub fn list(&self) -> Result<Vec<SessionId>, MetadataError> {
        let entries = match fs::read_dir(&self.sessions_dir) {
            Ok(e) => e,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(MetadataError::io(&self.sessions_dir, e)),
        };
        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| MetadataError::io(&self.sessions_dir, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with('.') || name.ends_with(".tmp") {
                continue;
            }
            ids.push(SessionId::new(name));
        }
        Ok(ids)
    }
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
