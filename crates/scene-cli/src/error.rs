//! Error types for the CLI

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to the terminal
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Doc(#[from] scene_doc::Error),

    #[error(transparent)]
    Repair(#[from] scene_repair::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
