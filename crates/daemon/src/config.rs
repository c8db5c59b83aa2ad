// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration and the exclusive-instance lock (spec.md is silent
//! on process supervision; this is ambient-stack scaffolding so `aod` can
//! be started more than once on a box without two pollers racing on the
//! same metadata store).

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use fs2::FileExt;
use thiserror::Error;

/// Paths the daemon process owns. One instance serves every project listed
/// in its `OrchestratorConfig`; there is no per-project daemon.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Root state directory (e.g. `~/.local/state/ao`).
    pub state_dir: PathBuf,
    /// Exclusive-instance lock/PID file.
    pub lock_path: PathBuf,
    /// Log file path.
    pub log_path: PathBuf,
    /// Directory the metadata store keeps session files in.
    pub sessions_dir: PathBuf,
    /// Outcome-metrics transition log path.
    pub metrics_path: PathBuf,
}

impl DaemonConfig {
    /// Load configuration for the user-level daemon, using fixed paths
    /// under `~/.local/state/ao/` (or `$AO_STATE_DIR` / `$XDG_STATE_HOME/ao`).
    pub fn load() -> Result<Self, DaemonError> {
        let state_dir = crate::env::state_dir()?;
        Ok(Self {
            lock_path: state_dir.join("daemon.pid"),
            log_path: state_dir.join("daemon.log"),
            sessions_dir: state_dir.join("sessions"),
            metrics_path: state_dir.join("metrics.jsonl"),
            state_dir,
        })
    }

    /// Acquire the exclusive-instance lock and stamp it with this process's
    /// PID. Held for the process lifetime; released automatically on drop.
    pub fn acquire_lock(&self) -> Result<File, DaemonError> {
        if let Some(parent) = self.lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut lock_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)?;
        lock_file.try_lock_exclusive().map_err(DaemonError::LockFailed)?;
        lock_file.set_len(0)?;
        writeln!(lock_file, "{}", std::process::id())?;
        Ok(lock_file)
    }

    /// Best-effort removal of the lock file on shutdown. The lock itself is
    /// released when the held `File` is dropped regardless.
    pub fn release_lock(&self) {
        if self.lock_path.exists() {
            if let Err(err) = std::fs::remove_file(&self.lock_path) {
                tracing::warn!(%err, "failed to remove daemon lock file");
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("could not determine state directory")]
    NoStateDir,

    #[error("failed to acquire daemon lock: another instance already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Session(#[from] ao_engine::SessionError),
}
