//! The detect → backup → repair → write → verify pipeline
//!
//! One repair run is a sequential chain over the file: load + detect the
//! requested defect class, short-circuit if clean, snapshot the file,
//! apply the pure transform, write, reload as verification, and roll
//! back from the snapshot if the reload fails. Runs against the same
//! path serialize on a per-path lock held from detection through the
//! terminal state; runs against different paths are independent.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use async_trait::async_trait;

use crate::backup::{BackupHandle, BackupManager};
use crate::detect::{self, DefectClass};
use crate::error::{Error, Result};
use crate::repair;
use scene_doc::{SceneDocument, SceneStore, YamlStore};

/// Called once after a successful commit so whatever consumed the scene
/// file can reload derived state.
///
/// A notifier failure is logged and never masks the committed outcome.
#[async_trait]
pub trait ReloadNotifier: Send + Sync {
    async fn reload_requested(
        &self,
        path: &Path,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Outcome of a repair run that reached a successful terminal state.
#[derive(Debug)]
pub enum RepairOutcome {
    /// No findings of the requested class; nothing was written, no
    /// backup was made.
    Clean,

    /// The repaired document was written and verified by a reload.
    /// The backup stays on disk; retention is an operator concern.
    Committed {
        /// Findings of the requested class that the transform resolved.
        repaired: usize,
        backup: BackupHandle,
    },
}

/// Per-path single-flight locks. Interleaved backup/restore from two
/// concurrent repairs on one file would corrupt the recovery guarantee,
/// no matter how many pipelines the host constructs, so the registry is
/// process-wide. Entries are evicted once no run holds or waits on
/// them, keeping the map bounded in long-lived hosts.
#[derive(Default)]
struct PathLocks {
    inner: Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>,
}

static PATH_LOCKS: LazyLock<PathLocks> = LazyLock::new(PathLocks::default);

impl PathLocks {
    fn global() -> &'static PathLocks {
        &PATH_LOCKS
    }

    fn for_path(&self, path: &Path) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.entry(path.to_path_buf()).or_default().clone()
    }

    /// Drop the entry for `path` unless another run holds or waits on
    /// it (the map's own reference is the remaining one).
    fn release(&self, path: &Path) {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if map.get(path).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            map.remove(path);
        }
    }

    #[cfg(test)]
    fn tracks(&self, path: &Path) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }
}

/// Orchestrates safe repairs of scene-configuration files.
///
/// The per-path lock registry is shared by every pipeline in the
/// process, so repairs of one file serialize even across pipeline
/// instances.
pub struct RepairPipeline {
    store: Arc<dyn SceneStore>,
    backups: BackupManager,
    notifier: Option<Arc<dyn ReloadNotifier>>,
}

impl Default for RepairPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl RepairPipeline {
    /// Pipeline over the production YAML store.
    pub fn new() -> Self {
        Self::with_store(Arc::new(YamlStore::new()))
    }

    /// Pipeline over a caller-supplied store.
    pub fn with_store(store: Arc<dyn SceneStore>) -> Self {
        Self {
            store,
            backups: BackupManager::new(),
            notifier: None,
        }
    }

    /// Attach a reload notifier invoked after each commit.
    pub fn with_notifier(mut self, notifier: Arc<dyn ReloadNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Run one repair for `class` against the file at `path`.
    ///
    /// Detection always runs against the current file content, never a
    /// cached scan. Once the write begins, the run is guaranteed to
    /// reach a terminal state (`Committed` or rolled back) even if the
    /// returned future is dropped: the critical section runs in a
    /// spawned task holding the path lock. Dropping the future before
    /// the backup step aborts with no side effects.
    pub async fn repair(&self, path: &Path, class: DefectClass) -> Result<RepairOutcome> {
        let result = self.run_locked(path, class).await;
        PathLocks::global().release(path);
        result
    }

    async fn run_locked(&self, path: &Path, class: DefectClass) -> Result<RepairOutcome> {
        let guard = PathLocks::global().for_path(path).lock_owned().await;

        let doc = self.store.load(path).await?;
        let findings = detect::find(&doc, class);
        if findings.is_empty() {
            tracing::debug!(path = %path.display(), ?class, "No findings, nothing to repair");
            return Ok(RepairOutcome::Clean);
        }
        let repaired = findings.len();

        let store = Arc::clone(&self.store);
        let backups = self.backups.clone();
        let notifier = self.notifier.clone();
        let path = path.to_path_buf();
        let task = tokio::spawn(async move {
            // Hold the path lock until the terminal state.
            let _guard = guard;
            run_critical(store, backups, notifier, path, class, doc, repaired).await
        });

        task.await.map_err(|e| Error::TaskFailed {
            message: e.to_string(),
        })?
    }
}

/// Backup → repair → write → verify → commit-or-rollback. Must reach a
/// terminal state once entered.
async fn run_critical(
    store: Arc<dyn SceneStore>,
    backups: BackupManager,
    notifier: Option<Arc<dyn ReloadNotifier>>,
    path: PathBuf,
    class: DefectClass,
    doc: SceneDocument,
    repaired: usize,
) -> Result<RepairOutcome> {
    // Any backup failure aborts before the original is touched.
    let backup = backups.backup(&path).await?;

    let fixed = repair::apply(&doc, class);
    store.write(&path, &fixed).await?;

    // Verify by reloading; the store must hand back a parseable
    // document or the write is undone.
    if let Err(err) = store.load(&path).await {
        tracing::error!(
            path = %path.display(),
            ?class,
            error = %err,
            "Repair produced an unreadable document, rolling back"
        );
        backups.restore(&backup).await?;
        return Err(Error::Verification {
            path,
            message: err.to_string(),
        });
    }

    tracing::info!(path = %path.display(), ?class, repaired, "Repair committed");

    if let Some(notifier) = notifier {
        if let Err(err) = notifier.reload_requested(&path).await {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "Reload notification failed after commit"
            );
        }
    }

    Ok(RepairOutcome::Committed { repaired, backup })
}
