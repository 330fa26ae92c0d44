use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::model::bank::{Bank, BankFields, BankPatch};
use crate::model::config::StoreConfig;

use super::lock::{LockError, WriteLock};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not a funnel store: no funnel/ directory found")]
    NotAStore,
    #[error("no bank with id {0}")]
    NotFound(String),
    #[error("a bank needs a name")]
    NameRequired,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse funnel.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not serialize funnel.toml: {0}")]
    ConfigSerializeError(#[from] toml::ser::Error),
    #[error("invalid document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
    #[error(transparent)]
    LockError(#[from] LockError),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// An open store: the funnel/ directory, its parsed config, and the
/// collection of bank documents inside it.
#[derive(Debug)]
pub struct Store {
    /// Root directory of the store (parent of `funnel/`)
    pub root: PathBuf,
    /// Path to the `funnel/` directory
    pub funnel_dir: PathBuf,
    /// Parsed funnel.toml
    pub config: StoreConfig,
    /// Path to the collection directory holding one JSON document per bank
    collection_dir: PathBuf,
}

/// Discover the store by walking up from the given directory, looking for
/// a `funnel/` subdirectory with a funnel.toml in it.
pub fn discover_store(start: &Path) -> Result<PathBuf, StoreError> {
    let mut current = start.to_path_buf();
    loop {
        let funnel_dir = current.join("funnel");
        if funnel_dir.is_dir() && funnel_dir.join("funnel.toml").exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(StoreError::NotAStore);
        }
    }
}

/// Open the store at (or above) `start`, creating a fresh one in `start`
/// if none is found. The original system connected to an always-present
/// remote collection; a directory-backed store has to bootstrap itself on
/// first launch instead.
pub fn open_or_init(start: &Path) -> Result<Store, StoreError> {
    match discover_store(start) {
        Ok(root) => Store::open(&root),
        Err(StoreError::NotAStore) => {
            init_store(start)?;
            Store::open(start)
        }
        Err(e) => Err(e),
    }
}

/// Create `funnel/funnel.toml` (default config) and an empty collection
/// directory under `root`.
fn init_store(root: &Path) -> Result<(), StoreError> {
    let funnel_dir = root.join("funnel");
    let config = StoreConfig::default();
    fs::create_dir_all(funnel_dir.join(&config.store.collection))?;
    let config_text = toml::to_string_pretty(&config)?;
    atomic_write(&funnel_dir.join("funnel.toml"), config_text.as_bytes())?;
    Ok(())
}

impl Store {
    /// Open an existing store rooted at `root`.
    pub fn open(root: &Path) -> Result<Store, StoreError> {
        let funnel_dir = root.join("funnel");
        if !funnel_dir.is_dir() {
            return Err(StoreError::NotAStore);
        }

        let config_path = funnel_dir.join("funnel.toml");
        let config_text = fs::read_to_string(&config_path).map_err(|e| StoreError::ReadError {
            path: config_path.clone(),
            source: e,
        })?;
        let config: StoreConfig = toml::from_str(&config_text)?;

        let collection_dir = funnel_dir.join(&config.store.collection);
        fs::create_dir_all(&collection_dir)?;

        Ok(Store {
            root: root.to_path_buf(),
            funnel_dir,
            config,
            collection_dir,
        })
    }

    /// The directory the subscription watches.
    pub fn collection_dir(&self) -> &Path {
        &self.collection_dir
    }

    fn doc_path(&self, id: &str) -> PathBuf {
        self.collection_dir.join(format!("{id}.json"))
    }

    /// Read the full record set, ordered by name ascending
    /// (case-insensitive). Documents that fail to parse are skipped —
    /// a collaborator's half-written or corrupt file must never take the
    /// whole snapshot down.
    pub fn load_all(&self) -> Result<Vec<Bank>, StoreError> {
        let entries = fs::read_dir(&self.collection_dir).map_err(|e| StoreError::ReadError {
            path: self.collection_dir.clone(),
            source: e,
        })?;

        let mut banks = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Ok(text) = fs::read_to_string(&path) else {
                continue;
            };
            match serde_json::from_str::<Bank>(&text) {
                Ok(bank) => banks.push(bank),
                Err(_) => continue,
            }
        }

        banks.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(banks)
    }

    /// Write a new bank with a store-assigned id and fresh timestamps.
    pub fn create(&self, fields: BankFields) -> Result<Bank, StoreError> {
        if fields.name.trim().is_empty() {
            return Err(StoreError::NameRequired);
        }

        let now = Utc::now();
        let bank = Bank {
            id: Uuid::new_v4().to_string(),
            name: fields.name,
            location: fields.location,
            contact: fields.contact,
            email: fields.email,
            phone: fields.phone,
            stage: fields.stage,
            notes: fields.notes,
            pasteurizer: fields.pasteurizer,
            volume_potential: fields.volume_potential,
            bottle_sizes: fields.bottle_sizes,
            next_action: fields.next_action,
            last_contact: fields.last_contact,
            created_at: now,
            updated_at: now,
        };

        let _lock = WriteLock::acquire(&self.collection_dir)?;
        self.write_doc(&bank)?;
        Ok(bank)
    }

    /// Merge a patch into the stored document, refreshing `updated_at`.
    /// The merge happens against the latest document on disk, so a save
    /// over a concurrent edit resolves last-write-wins per field set.
    pub fn update(&self, id: &str, patch: BankPatch) -> Result<Bank, StoreError> {
        let _lock = WriteLock::acquire(&self.collection_dir)?;

        let path = self.doc_path(id);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()));
            }
            Err(e) => return Err(StoreError::ReadError { path, source: e }),
        };
        let mut bank: Bank = serde_json::from_str(&text)?;

        bank.apply(patch);
        bank.updated_at = Utc::now();
        self.write_doc(&bank)?;
        Ok(bank)
    }

    /// Remove a bank's document. Idempotent: deleting an id that is
    /// already gone is Ok, per document-store delete semantics.
    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _lock = WriteLock::acquire(&self.collection_dir)?;

        let path = self.doc_path(id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::WriteError { path, source: e }),
        }
    }

    fn write_doc(&self, bank: &Bank) -> Result<(), StoreError> {
        let path = self.doc_path(&bank.id);
        let payload = serde_json::to_vec_pretty(bank)?;
        atomic_write(&path, &payload).map_err(|e| StoreError::WriteError { path, source: e })
    }
}

/// Write via a temp file in the same directory, then rename into place,
/// so readers and the watcher never observe a partial document.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::bank::Stage;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn open_test_store(tmp: &TempDir) -> Store {
        open_or_init(tmp.path()).unwrap()
    }

    #[test]
    fn init_creates_config_and_collection() {
        let tmp = TempDir::new().unwrap();
        let store = open_test_store(&tmp);
        assert!(tmp.path().join("funnel/funnel.toml").exists());
        assert!(store.collection_dir().is_dir());
        assert_eq!(store.config.store.collection, "banks");
    }

    #[test]
    fn discover_from_subdirectory() {
        let tmp = TempDir::new().unwrap();
        open_test_store(&tmp);
        let sub = tmp.path().join("funnel/banks");
        assert_eq!(discover_store(&sub).unwrap(), tmp.path());
    }

    #[test]
    fn create_with_only_a_name_sets_defaults_and_equal_timestamps() {
        let tmp = TempDir::new().unwrap();
        let store = open_test_store(&tmp);

        let bank = store
            .create(BankFields {
                name: "Bank A".into(),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(bank.stage, Stage::Unknown);
        assert_eq!(bank.created_at, bank.updated_at);
        assert_eq!(bank.volume_potential, 0);
        assert!(bank.location.is_empty());
        assert!(bank.bottle_sizes.is_empty());
        assert!(bank.next_action.is_none());

        // And it round-trips through the snapshot
        let banks = store.load_all().unwrap();
        assert_eq!(banks, vec![bank]);
    }

    #[test]
    fn create_requires_a_name() {
        let tmp = TempDir::new().unwrap();
        let store = open_test_store(&tmp);
        let err = store.create(BankFields::default()).unwrap_err();
        assert!(matches!(err, StoreError::NameRequired));
    }

    #[test]
    fn update_refreshes_updated_at_and_leaves_other_fields() {
        let tmp = TempDir::new().unwrap();
        let store = open_test_store(&tmp);
        let bank = store
            .create(BankFields {
                name: "Bank A".into(),
                location: "Austin".into(),
                volume_potential: 250,
                ..Default::default()
            })
            .unwrap();

        let updated = store
            .update(
                &bank.id,
                BankPatch {
                    stage: Some(Stage::Sampled),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.stage, Stage::Sampled);
        assert!(updated.updated_at >= bank.updated_at);
        assert_eq!(updated.created_at, bank.created_at);
        assert_eq!(updated.location, "Austin");
        assert_eq!(updated.volume_potential, 250);
    }

    #[test]
    fn update_vanished_record_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = open_test_store(&tmp);
        let err = store.update("gone", BankPatch::default()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "gone"));
    }

    #[test]
    fn delete_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = open_test_store(&tmp);
        let bank = store
            .create(BankFields {
                name: "Bank A".into(),
                ..Default::default()
            })
            .unwrap();

        store.delete(&bank.id).unwrap();
        assert!(store.load_all().unwrap().is_empty());
        // Second delete of the same id is still Ok
        store.delete(&bank.id).unwrap();
    }

    #[test]
    fn load_all_orders_by_name_case_insensitively() {
        let tmp = TempDir::new().unwrap();
        let store = open_test_store(&tmp);
        for name in ["delta", "Alpha", "charlie", "Bravo"] {
            store
                .create(BankFields {
                    name: name.into(),
                    ..Default::default()
                })
                .unwrap();
        }

        let names: Vec<String> = store
            .load_all()
            .unwrap()
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Bravo", "charlie", "delta"]);
    }

    #[test]
    fn unparseable_documents_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let store = open_test_store(&tmp);
        store
            .create(BankFields {
                name: "Good".into(),
                ..Default::default()
            })
            .unwrap();
        fs::write(store.collection_dir().join("junk.json"), "not json {{{").unwrap();

        let banks = store.load_all().unwrap();
        assert_eq!(banks.len(), 1);
        assert_eq!(banks[0].name, "Good");
    }
}
