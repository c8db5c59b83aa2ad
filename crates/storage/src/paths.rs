// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Paths & IDs (spec.md §4.6): derive per-config, per-project, per-session
//! directories from a stable hash of the config path and project path.
//!
//! ```text
//! <projectBaseDir>/sessions/<id>
//! <projectBaseDir>/sessions/archive/<id>_<timestamp>
//! ```
//! where `projectBaseDir = <home>/.agent-orchestrator/<hash12>-<sanitized project basename>`.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// First 12 hex characters of SHA-256(abs(config_path) + "\0" + abs(project_path)).
///
/// Reproducible across runs (pure function of the two paths) and unique
/// across configurations (collision-resistant hash, not a weak checksum).
pub fn hash12(config_path: &Path, project_path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(config_path.to_string_lossy().as_bytes());
    hasher.update([0u8]);
    hasher.update(project_path.to_string_lossy().as_bytes());
    let digest = hasher.finalize();
    let hex = digest.iter().map(|b| format!("{:02x}", b)).collect::<String>();
    hex[..12].to_string()
}

/// Replace anything outside `[a-zA-Z0-9_-]` with `_`, matching the session
/// prefix character class (spec.md §4.6).
pub fn sanitize_basename(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}

/// `<home>/.agent-orchestrator/<hash12>-<sanitized project basename>`.
pub fn project_base_dir(home: &Path, config_path: &Path, project_path: &Path) -> PathBuf {
    let hash = hash12(config_path, project_path);
    let basename = project_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());
    let dirname = format!("{hash}-{}", sanitize_basename(&basename));
    home.join(".agent-orchestrator").join(dirname)
}

pub fn sessions_dir(project_base_dir: &Path) -> PathBuf {
    project_base_dir.join("sessions")
}

pub fn archive_dir(project_base_dir: &Path) -> PathBuf {
    sessions_dir(project_base_dir).join("archive")
}

/// Validates the `[a-zA-Z0-9_-]+` character class required of session
/// prefixes (spec.md §4.6).
pub fn is_valid_prefix(prefix: &str) -> bool {
    !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
