//! Typed model for the scene-configuration file

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single attribute value as it appears in the YAML document.
///
/// Scene attributes are scalars in practice (string, number, boolean,
/// null); sequences and mappings are tolerated and passed through
/// repairs untouched.
pub type AttrValue = serde_yaml::Value;

/// Attribute name to value mapping for one entity of a scene.
pub type AttributeMap = BTreeMap<String, AttrValue>;

/// True for the values a cleanup repair removes: YAML null and the
/// empty string.
pub fn is_empty_value(value: &AttrValue) -> bool {
    match value {
        AttrValue::Null => true,
        AttrValue::String(s) => s.is_empty(),
        _ => false,
    }
}

/// One scene record in the configuration file.
///
/// `id` should be unique across the document, but the model tolerates
/// violations — detecting them is the repair engine's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRecord {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Entity id to attribute map.
    #[serde(default)]
    pub entities: BTreeMap<String, AttributeMap>,

    /// Keys the engine does not model (icon, metadata, ...). Repairs
    /// rewrite the whole file, so these must survive a
    /// load/repair/write cycle.
    #[serde(flatten)]
    pub extra: BTreeMap<String, AttrValue>,
}

impl SceneRecord {
    /// Name for user-facing reports; falls back to "Unknown" for
    /// records without one.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Unknown"
        } else {
            &self.name
        }
    }

    /// Total count of null/empty attribute values across all entities.
    pub fn empty_attribute_count(&self) -> usize {
        self.entities
            .values()
            .flat_map(|attrs| attrs.values())
            .filter(|value| is_empty_value(value))
            .count()
    }
}

/// The whole configuration file: an ordered sequence of scene records.
///
/// Owned by one load/write cycle; never cached across pipeline runs
/// because the file on disk is the source of truth.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneDocument {
    pub records: Vec<SceneRecord>,
}

impl SceneDocument {
    pub fn new(records: Vec<SceneRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
