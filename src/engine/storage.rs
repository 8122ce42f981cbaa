//! File-backed storage engine
//!
//! Holds every live [`Entity`] keyed by `"ClassName.id"` and persists the set
//! to a single JSON document.
//!
//! # Document layout
//!
//! ```text
//! {
//!   "User.6f1c...": { "__class__": "User", "id": "6f1c...", "created_at": "...", ... },
//!   "City.09ab...": { ... }
//! }
//! ```
//!
//! # Guarantees
//!
//! - **Atomic save**: the document is written to a sibling temp file and renamed
//!   over the target, so a reader never sees a half-written file
//! - **Forgiving reload**: a missing or unparseable document yields an empty set;
//!   individual bad records are skipped with a warning
//! - **Stable order**: entries are kept sorted by key, so listings are
//!   deterministic

use crate::error::{HbnbError, Result};
use crate::models::Entity;
use crate::types::EntityKind;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default backing file, relative to the working directory
pub const DEFAULT_FILE_PATH: &str = "file.json";

/// Persistence and lookup authority for all entities.
#[derive(Debug)]
pub struct FileStorage {
    file_path: PathBuf,
    objects: BTreeMap<String, Entity>,
}

impl FileStorage {
    /// Create an empty storage bound to `file_path`. Nothing is read until
    /// [`FileStorage::reload`] is called.
    pub fn new_with_path(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            objects: BTreeMap::new(),
        }
    }

    /// Create a storage bound to `file_path` and load whatever it holds.
    pub fn open(file_path: impl Into<PathBuf>) -> Self {
        let mut storage = Self::new_with_path(file_path);
        storage.reload();
        storage
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// The live object set
    pub fn all(&self) -> &BTreeMap<String, Entity> {
        &self.objects
    }

    /// The live object set, mutable. Callers that change it must call
    /// [`FileStorage::save`] to persist.
    pub fn all_mut(&mut self) -> &mut BTreeMap<String, Entity> {
        &mut self.objects
    }

    /// Entities of a single class, in key order
    pub fn all_of(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.objects.values().filter(move |e| e.kind() == kind)
    }

    /// Register `entity` under its composite key, replacing any previous entry
    pub fn new(&mut self, entity: Entity) {
        let key = entity.key();
        debug!("Registering {}", key);
        self.objects.insert(key, entity);
    }

    pub fn get(&self, kind: EntityKind, id: &str) -> Option<&Entity> {
        self.objects.get(&kind.key(id))
    }

    pub fn get_mut(&mut self, kind: EntityKind, id: &str) -> Option<&mut Entity> {
        self.objects.get_mut(&kind.key(id))
    }

    /// Remove an entity from the in-memory set. Does not persist.
    pub fn remove(&mut self, kind: EntityKind, id: &str) -> Option<Entity> {
        self.objects.remove(&kind.key(id))
    }

    /// Number of entities whose class is `kind`
    pub fn count(&self, kind: EntityKind) -> usize {
        self.all_of(kind).count()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Serialize the whole set and atomically replace the backing document.
    pub fn save(&self) -> Result<()> {
        let document: Map<String, Value> = self
            .objects
            .iter()
            .map(|(key, entity)| (key.clone(), Value::Object(entity.to_dict())))
            .collect();
        let json = serde_json::to_string_pretty(&Value::Object(document))?;

        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = temp_path_for(&self.file_path)?;
        fs::write(&temp_path, json)?;
        if let Err(e) = fs::rename(&temp_path, &self.file_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        debug!("Saved {} objects to {:?}", self.objects.len(), self.file_path);
        Ok(())
    }

    /// Replace the in-memory set with the contents of the backing document.
    ///
    /// Never fails: a missing file, unreadable file or malformed document all
    /// leave the set empty.
    pub fn reload(&mut self) {
        self.objects.clear();

        let content = match fs::read_to_string(&self.file_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No storage file at {:?}, starting empty", self.file_path);
                return;
            }
            Err(e) => {
                warn!("Failed to read storage file {:?}: {}", self.file_path, e);
                return;
            }
        };

        match parse_document(&content) {
            Ok(objects) => {
                info!("Loaded {} objects from {:?}", objects.len(), self.file_path);
                self.objects = objects;
            }
            Err(e) => {
                warn!("Ignoring malformed storage file {:?}: {}", self.file_path, e);
            }
        }
    }
}

/// Sibling temp file in the same directory, so the rename stays on one filesystem
fn temp_path_for(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| HbnbError::config(format!("storage path {:?} has no file name", path)))?;
    let mut temp_name = file_name.to_os_string();
    temp_name.push(".tmp");
    Ok(path.with_file_name(temp_name))
}

/// Parse a storage document. Fails only when the document as a whole is not a
/// JSON object; bad records inside it are skipped.
fn parse_document(content: &str) -> Result<BTreeMap<String, Entity>> {
    let document: Value = serde_json::from_str(content)?;
    let Value::Object(records) = document else {
        return Err(HbnbError::storage("top-level value is not an object"));
    };

    let mut objects = BTreeMap::new();
    for (key, record) in records {
        let Value::Object(record) = record else {
            warn!("Skipping {}: record is not an object", key);
            continue;
        };
        match Entity::from_dict(&record) {
            Ok(entity) => {
                objects.insert(entity.key(), entity);
            }
            Err(e) => warn!("Skipping {}: {}", key, e),
        }
    }
    Ok(objects)
}
