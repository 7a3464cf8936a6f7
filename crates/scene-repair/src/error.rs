//! Error types for scene-repair

use std::path::PathBuf;

/// Result type for scene-repair operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during a repair run.
///
/// Only `Verification` triggers automatic recovery (a single rollback
/// attempt); everything else is surfaced unchanged to the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Load/parse/write error from the document store
    #[error(transparent)]
    Doc(#[from] scene_doc::Error),

    /// Could not snapshot the original file; nothing was mutated
    #[error("Failed to create backup for {path}: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Post-write reload failed; the file was rolled back from backup
    #[error("Verification reload failed for {path}: {message}")]
    Verification { path: PathBuf, message: String },

    /// Restore from backup itself failed. The file may be in a
    /// partially-written state and the backup is the only recovery path.
    #[error("Rollback of {path} from {backup_path} failed: {source}")]
    RollbackFailed {
        path: PathBuf,
        backup_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The spawned critical-section task was lost (panic or runtime
    /// shutdown)
    #[error("Repair task failed: {message}")]
    TaskFailed { message: String },
}

impl Error {
    pub fn backup(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Backup {
            path: path.into(),
            source,
        }
    }
}
