//! End-to-end tests for the repair pipeline against real files.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use scene_doc::{AttrValue, SceneDocument, SceneStore, YamlStore};
use scene_repair::{
    DefectClass, Error, ReloadNotifier, RepairOutcome, RepairPipeline, find_duplicate_ids,
};
use scene_test_utils::{SceneFile, record, record_with_entities};

fn duplicate_doc() -> SceneDocument {
    SceneDocument::new(vec![
        record("s1", "A"),
        record("s1", "B"),
        record("s2", "C"),
    ])
}

#[tokio::test]
async fn duplicate_id_repair_commits_and_keeps_first_holder() {
    let file = SceneFile::new(&duplicate_doc());
    let original = file.read();
    let pipeline = RepairPipeline::new();

    let outcome = pipeline
        .repair(file.path(), DefectClass::DuplicateIds)
        .await
        .unwrap();
    let RepairOutcome::Committed { repaired, backup } = outcome else {
        panic!("expected a committed outcome");
    };
    assert_eq!(repaired, 1);

    let fixed = file.load();
    assert_eq!(fixed.records[0].id, "s1");
    assert!(fixed.records[1].id.starts_with("s1_"));
    assert_ne!(fixed.records[1].id, "s1");
    assert_ne!(fixed.records[1].id, "s2");
    assert_eq!(fixed.records[2].id, "s2");
    assert!(find_duplicate_ids(&fixed).is_empty());

    // The backup holds the pre-repair content, byte for byte.
    assert_eq!(std::fs::read_to_string(&backup.backup_path).unwrap(), original);
}

#[tokio::test]
async fn empty_attribute_repair_leaves_empty_entity_map() {
    let rec = record_with_entities(
        "s1",
        "A",
        &[(
            "light.x",
            &[
                ("brightness", AttrValue::Null),
                ("color", AttrValue::String(String::new())),
            ],
        )],
    );
    let file = SceneFile::new(&SceneDocument::new(vec![rec]));
    let pipeline = RepairPipeline::new();

    let outcome = pipeline
        .repair(file.path(), DefectClass::EmptyAttributes)
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        RepairOutcome::Committed { repaired: 1, .. }
    ));

    let fixed = file.load();
    let entity = &fixed.records[0].entities["light.x"];
    assert!(entity.is_empty());
    assert_eq!(fixed.records[0].entities.len(), 1);
}

#[tokio::test]
async fn clean_file_is_a_no_op_with_no_backup() {
    let file = SceneFile::new(&SceneDocument::new(vec![
        record("s1", "A"),
        record("s2", "B"),
    ]));
    let before = file.read();

    let outcome = RepairPipeline::new()
        .repair(file.path(), DefectClass::DuplicateIds)
        .await
        .unwrap();

    assert!(matches!(outcome, RepairOutcome::Clean));
    assert_eq!(file.read(), before);
    assert!(file.backups().is_empty());
}

#[tokio::test]
async fn repair_only_touches_the_requested_class() {
    // Empty attributes present, but the duplicate-id repair has nothing
    // to do.
    let rec = record_with_entities("s1", "A", &[("light.x", &[("color", AttrValue::Null)])]);
    let file = SceneFile::new(&SceneDocument::new(vec![rec]));

    let outcome = RepairPipeline::new()
        .repair(file.path(), DefectClass::DuplicateIds)
        .await
        .unwrap();
    assert!(matches!(outcome, RepairOutcome::Clean));

    let doc = file.load();
    assert_eq!(doc.records[0].empty_attribute_count(), 1);
}

#[tokio::test]
async fn unmodeled_keys_survive_a_repair() {
    let file = SceneFile::with_content(
        "- id: s1\n  name: A\n  icon: mdi:lamp\n- id: s1\n  name: B\n",
    );

    RepairPipeline::new()
        .repair(file.path(), DefectClass::DuplicateIds)
        .await
        .unwrap();

    let fixed = file.load();
    assert_eq!(
        fixed.records[0].extra.get("icon"),
        Some(&AttrValue::String("mdi:lamp".into()))
    );
}

#[tokio::test]
async fn missing_file_is_surfaced_as_not_found() {
    let temp = tempfile::TempDir::new().unwrap();
    let err = RepairPipeline::new()
        .repair(&temp.path().join("absent.yaml"), DefectClass::DuplicateIds)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Doc(scene_doc::Error::NotFound { .. })));
}

/// Store whose writes corrupt the file, to force the verification
/// reload to fail.
struct SabotageStore {
    inner: YamlStore,
}

#[async_trait]
impl SceneStore for SabotageStore {
    async fn load(&self, path: &Path) -> scene_doc::Result<SceneDocument> {
        self.inner.load(path).await
    }

    async fn write(&self, path: &Path, _doc: &SceneDocument) -> scene_doc::Result<()> {
        tokio::fs::write(path, "][ not yaml")
            .await
            .map_err(|e| scene_doc::Error::io(path, e))
    }
}

#[tokio::test]
async fn failed_verification_rolls_back_byte_for_byte() {
    let file = SceneFile::new(&duplicate_doc());
    let before = file.read();
    let pipeline = RepairPipeline::with_store(Arc::new(SabotageStore { inner: YamlStore::new() }));

    let err = pipeline
        .repair(file.path(), DefectClass::DuplicateIds)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Verification { .. }));
    assert_eq!(file.read(), before);
    // The rollback rename consumed the backup.
    assert!(file.backups().is_empty());
}

#[tokio::test]
async fn concurrent_repairs_on_one_path_serialize() {
    let file = SceneFile::new(&duplicate_doc());
    let pipeline = RepairPipeline::new();

    let (a, b) = tokio::join!(
        pipeline.repair(file.path(), DefectClass::DuplicateIds),
        pipeline.repair(file.path(), DefectClass::DuplicateIds),
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    // The second run sees the first run's committed result: exactly one
    // repair happened.
    let committed = outcomes
        .iter()
        .filter(|o| matches!(o, RepairOutcome::Committed { .. }))
        .count();
    let clean = outcomes
        .iter()
        .filter(|o| matches!(o, RepairOutcome::Clean))
        .count();
    assert_eq!((committed, clean), (1, 1));

    assert!(find_duplicate_ids(&file.load()).is_empty());
    assert_eq!(file.backups().len(), 1);
}

#[tokio::test]
async fn separate_pipelines_serialize_on_one_path() {
    let file = SceneFile::new(&duplicate_doc());
    let first = RepairPipeline::new();
    let second = RepairPipeline::new();

    let (a, b) = tokio::join!(
        first.repair(file.path(), DefectClass::DuplicateIds),
        second.repair(file.path(), DefectClass::DuplicateIds),
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    // The lock registry is process-wide: exactly one instance repairs,
    // the other sees the committed result.
    let committed = outcomes
        .iter()
        .filter(|o| matches!(o, RepairOutcome::Committed { .. }))
        .count();
    assert_eq!(committed, 1);
    assert!(find_duplicate_ids(&file.load()).is_empty());
    assert_eq!(file.backups().len(), 1);
}

#[tokio::test]
async fn repairs_on_distinct_paths_run_independently() {
    let first = SceneFile::new(&duplicate_doc());
    let second = SceneFile::new(&duplicate_doc());
    let pipeline = RepairPipeline::new();

    let (a, b) = tokio::join!(
        pipeline.repair(first.path(), DefectClass::DuplicateIds),
        pipeline.repair(second.path(), DefectClass::DuplicateIds),
    );

    assert!(matches!(a.unwrap(), RepairOutcome::Committed { .. }));
    assert!(matches!(b.unwrap(), RepairOutcome::Committed { .. }));
}

#[tokio::test]
async fn rapid_repeated_repairs_keep_distinct_backups() {
    let file = SceneFile::new(&duplicate_doc());
    let pipeline = RepairPipeline::new();

    pipeline
        .repair(file.path(), DefectClass::DuplicateIds)
        .await
        .unwrap();
    // Reintroduce the defect and repair again within the same second.
    file.write(&serde_yaml::to_string(&duplicate_doc()).unwrap());
    pipeline
        .repair(file.path(), DefectClass::DuplicateIds)
        .await
        .unwrap();

    let backups = file.backups();
    assert_eq!(backups.len(), 2);
    assert_ne!(backups[0], backups[1]);
    for backup in &backups {
        let name = backup.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("scenes.yaml.backup_"), "got {name}");
    }
}

#[derive(Default)]
struct RecordingNotifier {
    calls: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl ReloadNotifier for RecordingNotifier {
    async fn reload_requested(
        &self,
        path: &Path,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.calls.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

struct FailingNotifier;

#[async_trait]
impl ReloadNotifier for FailingNotifier {
    async fn reload_requested(
        &self,
        _path: &Path,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Err("reload refused".into())
    }
}

#[tokio::test]
async fn notifier_runs_after_commit_but_not_after_clean() {
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = RepairPipeline::new().with_notifier(notifier.clone());

    let dirty = SceneFile::new(&duplicate_doc());
    pipeline
        .repair(dirty.path(), DefectClass::DuplicateIds)
        .await
        .unwrap();
    assert_eq!(notifier.calls.lock().unwrap().as_slice(), &[dirty.path().to_path_buf()]);

    let clean = SceneFile::new(&SceneDocument::new(vec![record("s1", "A")]));
    pipeline
        .repair(clean.path(), DefectClass::DuplicateIds)
        .await
        .unwrap();
    assert_eq!(notifier.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn notifier_failure_never_masks_the_commit() {
    let file = SceneFile::new(&duplicate_doc());
    let pipeline = RepairPipeline::new().with_notifier(Arc::new(FailingNotifier));

    let outcome = pipeline
        .repair(file.path(), DefectClass::DuplicateIds)
        .await
        .unwrap();
    assert!(matches!(outcome, RepairOutcome::Committed { .. }));
}
