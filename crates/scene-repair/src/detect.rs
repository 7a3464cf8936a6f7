//! Defect detection over scene documents
//!
//! Pure and deterministic: detectors take an in-memory document and
//! return structured findings, performing no I/O. The pipeline re-runs
//! detection immediately before repairing, because the file on disk may
//! have changed since an earlier scan.

use std::collections::HashMap;

use serde::Serialize;

use scene_doc::{SceneDocument, SceneRecord};

/// Defect classes the repair engine can fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectClass {
    DuplicateIds,
    EmptyAttributes,
}

/// User-facing severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// Structured evidence for one detected defect. Produced fresh on every
/// detection pass and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    /// Two or more records share one id. Group membership preserves
    /// document order; no ranking among the duplicates.
    DuplicateId { records: Vec<SceneRecord> },

    /// One record with its aggregate count of null/empty attribute
    /// values across all entities. Which entity holds which empty
    /// attribute is not preserved, only the total.
    EmptyAttributes { record: SceneRecord, count: usize },
}

impl Finding {
    pub fn class(&self) -> DefectClass {
        match self {
            Finding::DuplicateId { .. } => DefectClass::DuplicateIds,
            Finding::EmptyAttributes { .. } => DefectClass::EmptyAttributes,
        }
    }

    /// Duplicate ids break scene addressing outright; empty attributes
    /// only degrade restores.
    pub fn severity(&self) -> Severity {
        match self {
            Finding::DuplicateId { .. } => Severity::Error,
            Finding::EmptyAttributes { .. } => Severity::Warning,
        }
    }
}

/// Find groups of records sharing an id.
///
/// The empty string is a valid, groupable key. Returns one finding per
/// group with more than one member, groups ordered by first appearance.
pub fn find_duplicate_ids(doc: &SceneDocument) -> Vec<Finding> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&SceneRecord>> = HashMap::new();

    for record in &doc.records {
        let group = groups.entry(record.id.as_str()).or_default();
        if group.is_empty() {
            order.push(record.id.as_str());
        }
        group.push(record);
    }

    order
        .into_iter()
        .filter_map(|id| {
            let group = &groups[id];
            (group.len() > 1).then(|| Finding::DuplicateId {
                records: group.iter().map(|r| (*r).clone()).collect(),
            })
        })
        .collect()
}

/// Find records carrying null or empty-string attribute values.
///
/// A record is reported once, with a single aggregate count over all of
/// its entities.
pub fn find_empty_attributes(doc: &SceneDocument) -> Vec<Finding> {
    doc.records
        .iter()
        .filter_map(|record| {
            let count = record.empty_attribute_count();
            (count > 0).then(|| Finding::EmptyAttributes {
                record: record.clone(),
                count,
            })
        })
        .collect()
}

/// Detect one defect class.
pub fn find(doc: &SceneDocument, class: DefectClass) -> Vec<Finding> {
    match class {
        DefectClass::DuplicateIds => find_duplicate_ids(doc),
        DefectClass::EmptyAttributes => find_empty_attributes(doc),
    }
}

/// Detect all defect classes, duplicates first.
pub fn scan(doc: &SceneDocument) -> Vec<Finding> {
    let mut findings = find_duplicate_ids(doc);
    if !findings.is_empty() {
        tracing::warn!(groups = findings.len(), "Found scenes with duplicate IDs");
    }

    let empty = find_empty_attributes(doc);
    if !empty.is_empty() {
        tracing::warn!(scenes = empty.len(), "Found scenes with empty attributes");
    }

    findings.extend(empty);
    findings
}
