//! Safe configuration-repair engine for scene documents
//!
//! Detects structural defects in a scene-configuration file (duplicate
//! scene ids, empty attribute values) and applies corrective rewrites
//! with crash-safe backup, post-write verification, and automatic
//! rollback.
//!
//! # Architecture
//!
//! ```text
//!            RepairPipeline
//!                  |
//!     +--------+---+-----+---------+
//!     |        |         |         |
//!  Detector Repairer BackupManager SceneStore (scene-doc)
//! ```
//!
//! [`detect`] and [`repair`] are pure: they take an in-memory
//! [`SceneDocument`](scene_doc::SceneDocument) and perform no I/O. The
//! [`RepairPipeline`] owns the full detect → backup → mutate → verify →
//! commit-or-rollback cycle against a file; runs on the same path are
//! serialized on a per-path lock.
//!
//! Host-platform concerns (how findings become user-visible issues, how
//! derived state is reloaded after a commit, how entity ids resolve to
//! friendly names) stay outside this crate, behind the
//! [`ReloadNotifier`] and [`MetadataLookup`] seams.

pub mod backup;
pub mod detect;
pub mod error;
pub mod pipeline;
pub mod repair;
pub mod report;

pub use backup::{BackupHandle, BackupManager};
pub use detect::{
    DefectClass, Finding, Severity, find, find_duplicate_ids, find_empty_attributes, scan,
};
pub use error::{Error, Result};
pub use pipeline::{ReloadNotifier, RepairOutcome, RepairPipeline};
pub use repair::{apply, resolve_duplicate_ids, strip_empty_attributes};
pub use report::{
    DuplicateSceneInfo, EmptyAttributeSceneInfo, EntityMetadata, MetadataLookup, describe,
    duplicate_id_report, empty_attribute_report, entity_labels,
};
