//! Error types for scene-doc

use std::path::PathBuf;

/// Result type for scene-doc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, writing, or converting scene
/// documents
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Scene file not found at {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to parse scene document{}: {message}", origin(.path))]
    Parse {
        /// Set when the source came from a file; the pure parse
        /// primitive has no path to report.
        path: Option<PathBuf>,
        message: String,
    },

    #[error("Failed to serialize scene document: {message}")]
    Serialize { message: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

fn origin(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" at {}", p.display()))
        .unwrap_or_default()
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            path: None,
            message: message.into(),
        }
    }

    /// Attach the originating file path to a parse error; other
    /// variants already carry theirs.
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Self::Parse { message, .. } => Self::Parse {
                path: Some(path.into()),
                message,
            },
            other => other,
        }
    }
}
