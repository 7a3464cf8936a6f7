//! Findings payloads for external notifiers
//!
//! The host platform renders findings into user-facing issues; this
//! module produces exactly the fields that contract requires: `{name,
//! id}` per affected record for duplicates, `{name, id, empty_count}`
//! for empty attributes.

use serde::Serialize;

use crate::detect::Finding;
use scene_doc::SceneRecord;

/// One record affected by a duplicate-id defect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateSceneInfo {
    pub name: String,
    pub id: String,
}

/// One record carrying empty attribute values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyAttributeSceneInfo {
    pub name: String,
    pub id: String,
    pub empty_count: usize,
}

/// Flatten duplicate-id findings into one entry per affected record,
/// across all groups, in document order within each group.
pub fn duplicate_id_report(findings: &[Finding]) -> Vec<DuplicateSceneInfo> {
    findings
        .iter()
        .filter_map(|finding| match finding {
            Finding::DuplicateId { records } => Some(records),
            _ => None,
        })
        .flatten()
        .map(|record| DuplicateSceneInfo {
            name: record.display_name().to_string(),
            id: record.id.clone(),
        })
        .collect()
}

/// One entry per record with a non-zero empty-attribute count.
pub fn empty_attribute_report(findings: &[Finding]) -> Vec<EmptyAttributeSceneInfo> {
    findings
        .iter()
        .filter_map(|finding| match finding {
            Finding::EmptyAttributes { record, count } => Some(EmptyAttributeSceneInfo {
                name: record.display_name().to_string(),
                id: record.id.clone(),
                empty_count: *count,
            }),
            _ => None,
        })
        .collect()
}

/// Render a finding as the issue-list lines shown to users.
pub fn describe(finding: &Finding) -> String {
    match finding {
        Finding::DuplicateId { records } => records
            .iter()
            .map(|r| format!("- {} (ID: {})", r.display_name(), r.id))
            .collect::<Vec<_>>()
            .join("\n"),
        Finding::EmptyAttributes { record, count } => {
            format!("- {} has {} empty attributes", record.display_name(), count)
        }
    }
}

/// Metadata the host platform knows about an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityMetadata {
    pub friendly_name: Option<String>,
    pub area: Option<String>,
    pub icon: Option<String>,
}

/// Read-only lookup into the host platform's entity registry.
///
/// The engine never touches registries directly; callers inject an
/// implementation when they want enriched report output.
pub trait MetadataLookup: Send + Sync {
    fn resolve(&self, entity_id: &str) -> Option<EntityMetadata>;
}

/// Label each entity of a record, preferring the host's friendly name
/// and falling back to the raw entity id.
pub fn entity_labels(record: &SceneRecord, lookup: &dyn MetadataLookup) -> Vec<String> {
    record
        .entities
        .keys()
        .map(|entity_id| {
            lookup
                .resolve(entity_id)
                .and_then(|meta| meta.friendly_name)
                .unwrap_or_else(|| entity_id.clone())
        })
        .collect()
}
