//! Corrective transforms for detected defect classes
//!
//! Both transforms are pure: the input document is left unmodified and a
//! new document is returned, so the pipeline keeps an unaltered copy for
//! diagnostics if something downstream fails before commit.

use std::collections::HashSet;

use chrono::Utc;

use crate::detect::DefectClass;
use scene_doc::{SceneDocument, is_empty_value};

/// Rename later holders of a duplicated id.
///
/// Single left-to-right pass: the first record holding an id keeps it;
/// every subsequent holder gets `{id}_{millis}`, retried with a numeric
/// suffix until it collides with nothing already present or generated in
/// this pass.
pub fn resolve_duplicate_ids(doc: &SceneDocument) -> SceneDocument {
    let mut out = doc.clone();
    let mut taken: HashSet<String> = doc.records.iter().map(|r| r.id.clone()).collect();
    let mut seen: HashSet<String> = HashSet::new();

    for record in &mut out.records {
        if seen.contains(&record.id) {
            let fresh = fresh_id(&record.id, &taken);
            tracing::debug!(old = %record.id, new = %fresh, "Renaming duplicate scene id");
            taken.insert(fresh.clone());
            record.id = fresh;
        }
        seen.insert(record.id.clone());
    }

    out
}

/// Derive a replacement id that collides with nothing in `taken`.
///
/// Millisecond timestamps alone can collide under rapid repeated
/// repairs, hence the check-and-retry counter.
fn fresh_id(base: &str, taken: &HashSet<String>) -> String {
    let millis = Utc::now().timestamp_millis();
    let mut candidate = format!("{base}_{millis}");
    let mut attempt = 1u32;
    while taken.contains(&candidate) {
        candidate = format!("{base}_{millis}_{attempt}");
        attempt += 1;
    }
    candidate
}

/// Drop attribute entries whose value is null or the empty string.
///
/// Entities left with zero attributes stay in place as empty maps;
/// pruning entities or records is out of scope for this repair.
pub fn strip_empty_attributes(doc: &SceneDocument) -> SceneDocument {
    let mut out = doc.clone();
    for record in &mut out.records {
        for attrs in record.entities.values_mut() {
            attrs.retain(|_, value| !is_empty_value(value));
        }
    }
    out
}

/// Apply the transform for one defect class.
pub fn apply(doc: &SceneDocument, class: DefectClass) -> SceneDocument {
    match class {
        DefectClass::DuplicateIds => resolve_duplicate_ids(doc),
        DefectClass::EmptyAttributes => strip_empty_attributes(doc),
    }
}
