//! Timestamped sibling backups of a scene file
//!
//! The backup is the sole recovery artifact for a repair attempt, so it
//! lives next to the original where an operator can find it:
//! `{basename}.backup_{YYYYMMDD_HHMMSS}` (human-readable, sortable,
//! same directory). Nothing here deletes backups; retention is an
//! operator concern.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

/// Handle to one backup, valid for the duration of one repair attempt.
#[derive(Debug, Clone)]
pub struct BackupHandle {
    pub original_path: PathBuf,
    pub backup_path: PathBuf,
    pub created_at: DateTime<Utc>,
}

/// Creates and restores sibling backups of scene files.
#[derive(Debug, Default, Clone)]
pub struct BackupManager;

impl BackupManager {
    pub fn new() -> Self {
        Self
    }

    /// Copy `path` to a timestamped sibling and return the handle.
    ///
    /// The timestamp has second resolution; if two backups land in the
    /// same second the name gets a numeric suffix rather than clobbering
    /// the earlier backup. Fails without touching the original.
    pub async fn backup(&self, path: &Path) -> Result<BackupHandle> {
        let created_at = Utc::now();
        let stamp = created_at.format("%Y%m%d_%H%M%S");
        let base = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut backup_path = path.with_file_name(format!("{base}.backup_{stamp}"));
        let mut attempt = 1u32;
        while tokio::fs::try_exists(&backup_path)
            .await
            .map_err(|e| Error::backup(path, e))?
        {
            backup_path = path.with_file_name(format!("{base}.backup_{stamp}_{attempt}"));
            attempt += 1;
        }

        tokio::fs::copy(path, &backup_path).await.map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Failed to create backup");
            Error::backup(path, e)
        })?;

        tracing::debug!(
            path = %path.display(),
            backup = %backup_path.display(),
            "Created backup"
        );

        Ok(BackupHandle {
            original_path: path.to_path_buf(),
            backup_path,
            created_at,
        })
    }

    /// Atomically put the backed-up content back at the original path.
    ///
    /// Rename-style replace: an observer of the original path sees
    /// either the corrupt content or the full backup content, never a
    /// half-restored file. Consumes the backup file; the handle is
    /// single-use. Fails if the backup no longer exists, which is fatal
    /// for the repair attempt.
    pub async fn restore(&self, handle: &BackupHandle) -> Result<()> {
        tokio::fs::rename(&handle.backup_path, &handle.original_path)
            .await
            .map_err(|e| Error::RollbackFailed {
                path: handle.original_path.clone(),
                backup_path: handle.backup_path.clone(),
                source: e,
            })
    }
}
