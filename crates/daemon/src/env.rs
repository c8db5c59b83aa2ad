// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::DaemonError;

/// Resolve state directory: AO_STATE_DIR > XDG_STATE_HOME/ao > ~/.local/state/ao
pub fn state_dir() -> Result<PathBuf, DaemonError> {
    if let Ok(dir) = std::env::var("AO_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("ao"));
    }
    dirs::home_dir()
        .map(|home| home.join(".local/state/ao"))
        .ok_or(DaemonError::NoStateDir)
}

/// Poll interval override for the lifecycle sweep, in milliseconds.
pub fn poll_interval_ms() -> Option<Duration> {
    std::env::var("AO_POLL_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Max concurrent in-flight sessions override.
pub fn max_concurrency() -> Option<usize> {
    std::env::var("AO_MAX_CONCURRENCY").ok().and_then(|s| s.parse().ok())
}
