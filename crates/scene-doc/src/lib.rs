//! Scene document model and storage
//!
//! A scene-configuration file is a YAML document holding an ordered list
//! of scene records. This crate provides the typed model for that file
//! ([`SceneDocument`], [`SceneRecord`]), pure parse/serialize primitives,
//! and the [`SceneStore`] seam the repair pipeline loads and writes
//! through. The production store ([`YamlStore`]) writes atomically
//! (temp file + fsync + rename) so a reader never observes a byte-level
//! hybrid of old and new content.

pub mod document;
pub mod error;
pub mod store;

pub use document::{AttrValue, AttributeMap, SceneDocument, SceneRecord, is_empty_value};
pub use error::{Error, Result};
pub use store::{SceneStore, YamlStore, parse, serialize};
