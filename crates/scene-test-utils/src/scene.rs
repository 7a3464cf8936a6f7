//! Scene document and file fixtures.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use scene_doc::{AttrValue, AttributeMap, SceneDocument, SceneRecord};

/// A record with an id and a name and nothing else.
pub fn record(id: &str, name: &str) -> SceneRecord {
    SceneRecord {
        id: id.to_string(),
        name: name.to_string(),
        entities: BTreeMap::new(),
        extra: BTreeMap::new(),
    }
}

/// A record with entities given as `(entity_id, [(attribute, value)])`.
pub fn record_with_entities(
    id: &str,
    name: &str,
    entities: &[(&str, &[(&str, AttrValue)])],
) -> SceneRecord {
    let mut rec = record(id, name);
    for (entity_id, attrs) in entities {
        let map: AttributeMap = attrs
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        rec.entities.insert(entity_id.to_string(), map);
    }
    rec
}

/// A scene YAML file in its own temporary directory, with helpers for
/// setup and assertion.
///
/// # Example
///
/// ```rust,no_run
/// use scene_test_utils::{SceneFile, record};
/// use scene_doc::SceneDocument;
///
/// let file = SceneFile::new(&SceneDocument::new(vec![record("s1", "A")]));
/// assert!(file.path().exists());
/// ```
pub struct SceneFile {
    temp_dir: TempDir,
    path: PathBuf,
}

impl SceneFile {
    /// Write `doc` as YAML into a fresh temporary directory.
    pub fn new(doc: &SceneDocument) -> Self {
        Self::with_content(&serde_yaml::to_string(doc).unwrap())
    }

    /// Write raw content, which need not be valid YAML.
    pub fn with_content(content: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scenes.yaml");
        fs::write(&path, content).unwrap();
        Self { temp_dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Raw bytes currently on disk, as a string.
    pub fn read(&self) -> String {
        fs::read_to_string(&self.path).unwrap()
    }

    /// Overwrite the file with raw content.
    pub fn write(&self, content: &str) {
        fs::write(&self.path, content).unwrap();
    }

    /// Parse the current on-disk content.
    pub fn load(&self) -> SceneDocument {
        scene_doc::parse(&self.read()).unwrap()
    }

    /// Paths of all backup files sitting next to the scene file.
    pub fn backups(&self) -> Vec<PathBuf> {
        let mut backups: Vec<PathBuf> = fs::read_dir(self.dir())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().contains(".backup_"))
                    .unwrap_or(false)
            })
            .collect();
        backups.sort();
        backups
    }
}
