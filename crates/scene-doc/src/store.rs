//! Loading and writing scene documents with atomic replace semantics

use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::Path;

use async_trait::async_trait;
use fs2::FileExt;

use crate::document::SceneDocument;
use crate::error::{Error, Result};

/// Parse YAML source into a scene document. Pure, no I/O.
///
/// An empty (or whitespace-only) file is an empty document.
pub fn parse(source: &str) -> Result<SceneDocument> {
    if source.trim().is_empty() {
        return Ok(SceneDocument::default());
    }
    serde_yaml::from_str(source).map_err(|e| Error::parse(e.to_string()))
}

/// Serialize a scene document to YAML. Pure, no I/O.
pub fn serialize(doc: &SceneDocument) -> Result<String> {
    serde_yaml::to_string(doc).map_err(|e| Error::Serialize {
        message: e.to_string(),
    })
}

/// Storage seam the repair pipeline loads and writes through.
///
/// The production implementation is [`YamlStore`]; tests substitute
/// fault-injecting stores to exercise the rollback path.
#[async_trait]
pub trait SceneStore: Send + Sync {
    async fn load(&self, path: &Path) -> Result<SceneDocument>;
    async fn write(&self, path: &Path, doc: &SceneDocument) -> Result<()>;
}

/// Scene storage backed by YAML files on the local filesystem.
#[derive(Debug, Default, Clone)]
pub struct YamlStore;

impl YamlStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SceneStore for YamlStore {
    async fn load(&self, path: &Path) -> Result<SceneDocument> {
        match tokio::fs::read_to_string(path).await {
            Ok(source) => parse(&source).map_err(|e| e.with_path(path)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::NotFound {
                path: path.to_path_buf(),
            }),
            Err(e) => Err(Error::io(path, e)),
        }
    }

    async fn write(&self, path: &Path, doc: &SceneDocument) -> Result<()> {
        let content = serialize(doc)?;
        let target = path.to_path_buf();
        tracing::debug!(path = %target.display(), bytes = content.len(), "Writing scene document");
        tokio::task::spawn_blocking(move || write_atomic(&target, content.as_bytes()))
            .await
            .map_err(|e| Error::io(path, std::io::Error::other(e)))?
    }
}

/// Write content atomically with an advisory lock.
///
/// Write-to-temp-then-rename: a concurrent reader of `path` sees either
/// the previous content or the new content in full, never a partial
/// write.
fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Temp file in the same directory, so the rename stays on one
    // filesystem.
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .sync_all()
        .map_err(|e| Error::io(&temp_path, e))?;

    FileExt::unlock(&temp_file).map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))
}
