use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::LevelError;
use crate::grid::GridDocument;

use super::codec::{decode_document, encode_document};

pub const LEVEL_FILE_EXTENSION: &str = "lvl";
pub const NUMBERED_LEVEL_PREFIX: &str = "world_data";
pub const DEFAULT_LEVEL_NAME: &str = "world_data0";
const STAGING_SUFFIX: &str = "partial";

/// File stem of a persisted level document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LevelId(String);

impl LevelId {
    pub fn numbered(number: u32) -> Self {
        Self(format!("{NUMBERED_LEVEL_PREFIX}{number}"))
    }

    pub fn named(name: impl Into<String>) -> Result<Self, LevelError> {
        let name = name.into();
        let trimmed = name.trim();
        let is_valid = !trimmed.is_empty()
            && trimmed != "."
            && !trimmed.contains("..")
            && !trimmed.contains(|c: char| matches!(c, '/' | '\\' | '\0'));
        if !is_valid {
            return Err(LevelError::InvalidIdentifier(name));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Some(n)` for identifiers of the form `world_data<n>`.
    pub fn number(&self) -> Option<u32> {
        let digits = self.0.strip_prefix(NUMBERED_LEVEL_PREFIX)?;
        if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Anything the progression controller can pull level documents from.
pub trait LevelSource {
    fn load_level(&self, id: &LevelId) -> Result<GridDocument, LevelError>;
}

/// Level documents stored as `<id>.lvl` files in one directory.
#[derive(Debug, Clone)]
pub struct LevelStore {
    levels_dir: PathBuf,
}

impl LevelStore {
    pub fn new(levels_dir: impl Into<PathBuf>) -> Self {
        Self {
            levels_dir: levels_dir.into(),
        }
    }

    pub fn levels_dir(&self) -> &Path {
        &self.levels_dir
    }

    pub fn path_for(&self, id: &LevelId) -> PathBuf {
        self.levels_dir
            .join(format!("{}.{LEVEL_FILE_EXTENSION}", id.as_str()))
    }

    pub fn exists(&self, id: &LevelId) -> bool {
        self.path_for(id).is_file()
    }

    pub fn load(&self, id: &LevelId) -> Result<GridDocument, LevelError> {
        let path = self.path_for(id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                return Err(LevelError::NotFound {
                    id: id.to_string(),
                    path,
                });
            }
            Err(source) => return Err(LevelError::ReadFailure { path, source }),
        };
        let doc = decode_document(&bytes).map_err(|error| LevelError::ReadFailure {
            path: path.clone(),
            source: io::Error::new(io::ErrorKind::InvalidData, error),
        })?;
        debug!(
            level = %id,
            rows = doc.rows(),
            cols = doc.cols(),
            "level_document_read"
        );
        Ok(doc)
    }

    pub fn save(&self, doc: &GridDocument, id: &LevelId) -> Result<(), LevelError> {
        let path = self.path_for(id);
        let bytes = encode_document(doc).map_err(|error| LevelError::WriteFailure {
            path: path.clone(),
            source: io::Error::new(io::ErrorKind::InvalidInput, error),
        })?;
        self.replace_file(&path, &bytes)
            .map_err(|source| LevelError::WriteFailure {
                path: path.clone(),
                source,
            })?;
        info!(
            level = %id,
            path = %path.display(),
            rows = doc.rows(),
            cols = doc.cols(),
            "level_document_saved"
        );
        Ok(())
    }

    /// Stages `bytes` next to `path` and renames the staged file over it. The
    /// previous document stays in place until the rename succeeds.
    fn replace_file(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.levels_dir)?;
        let staged = staging_path(path);
        let result = fs::write(&staged, bytes).and_then(|()| fs::rename(&staged, path));
        if result.is_err() {
            let _ = fs::remove_file(&staged);
        }
        result
    }

    /// Returns the document at `id`; when none exists yet, persists a copy
    /// of `default_id` under `id` first. A missing default is `NotFound`.
    pub fn load_or_initialize(
        &self,
        id: &LevelId,
        default_id: &LevelId,
    ) -> Result<GridDocument, LevelError> {
        match self.load(id) {
            Ok(doc) => Ok(doc),
            Err(LevelError::NotFound { .. }) => {
                let template = self.load(default_id)?;
                self.save(&template, id)?;
                info!(level = %id, template = %default_id, "level_document_initialized");
                Ok(template)
            }
            Err(error) => Err(error),
        }
    }

    /// Sorted numbers of every `world_data<n>.lvl` in the directory.
    pub fn numbered_levels(&self) -> Result<Vec<u32>, LevelError> {
        let entries = fs::read_dir(&self.levels_dir).map_err(|source| LevelError::ReadFailure {
            path: self.levels_dir.clone(),
            source,
        })?;

        let mut numbers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| LevelError::ReadFailure {
                path: self.levels_dir.clone(),
                source,
            })?;
            let path = entry.path();
            let is_level_file = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == LEVEL_FILE_EXTENSION);
            if !is_level_file {
                continue;
            }
            let number = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| LevelId::named(stem).ok())
                .and_then(|id| id.number());
            if let Some(number) = number {
                numbers.push(number);
            }
        }
        numbers.sort_unstable();
        Ok(numbers)
    }

    /// Highest playable level number minus one: the controller keeps
    /// advancing while the current level is at most this value.
    pub fn discover_max_levels(&self) -> Result<u32, LevelError> {
        let highest = self.numbered_levels()?.last().copied().unwrap_or(0);
        Ok(highest.saturating_sub(1))
    }
}

fn staging_path(path: &Path) -> PathBuf {
    path.with_extension(format!("{LEVEL_FILE_EXTENSION}.{STAGING_SUFFIX}"))
}

impl LevelSource for LevelStore {
    fn load_level(&self, id: &LevelId) -> Result<GridDocument, LevelError> {
        self.load(id)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn sample_document() -> GridDocument {
        GridDocument::from_rows(vec![vec![-1, 0, 8], vec![1, 1, 1], vec![0, 7, 0]]).expect("doc")
    }

    #[test]
    fn saved_document_loads_cell_equal() {
        let temp = TempDir::new().expect("temp");
        let store = LevelStore::new(temp.path());
        let id = LevelId::numbered(3);
        let doc = sample_document();

        store.save(&doc, &id).expect("save");
        let loaded = store.load(&id).expect("load");

        assert_eq!(loaded, doc);
        assert!(store.path_for(&id).ends_with("world_data3.lvl"));
    }

    #[test]
    fn missing_document_is_not_found() {
        let temp = TempDir::new().expect("temp");
        let store = LevelStore::new(temp.path());

        let err = store.load(&LevelId::numbered(9)).expect_err("missing");

        assert!(err.is_not_found());
    }

    #[test]
    fn corrupt_document_is_read_failure() {
        let temp = TempDir::new().expect("temp");
        let store = LevelStore::new(temp.path());
        let id = LevelId::numbered(1);
        fs::write(store.path_for(&id), b"not a level").expect("write junk");

        let err = store.load(&id).expect_err("corrupt");

        match err {
            LevelError::ReadFailure { source, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::InvalidData);
            }
            other => panic!("expected ReadFailure, got {other:?}"),
        }
    }

    #[test]
    fn save_into_unwritable_location_is_write_failure() {
        let temp = TempDir::new().expect("temp");
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, b"file, not a directory").expect("write blocker");
        let store = LevelStore::new(blocker.join("lvl"));

        let err = store
            .save(&sample_document(), &LevelId::numbered(1))
            .expect_err("unwritable");

        assert!(matches!(err, LevelError::WriteFailure { .. }));
    }

    #[test]
    fn failed_save_keeps_previous_document() {
        let temp = TempDir::new().expect("temp");
        let store = LevelStore::new(temp.path());
        let id = LevelId::numbered(1);
        let previous = sample_document();
        store.save(&previous, &id).expect("seed");
        fs::create_dir(staging_path(&store.path_for(&id))).expect("block staging file");

        let err = store
            .save(&GridDocument::filled(3, 3, 1), &id)
            .expect_err("staging blocked");

        assert!(matches!(err, LevelError::WriteFailure { .. }));
        assert_eq!(store.load(&id).expect("reload"), previous);
    }

    #[test]
    fn resave_replaces_document_without_leaving_staging_file() {
        let temp = TempDir::new().expect("temp");
        let store = LevelStore::new(temp.path().join("nested"));
        let id = LevelId::numbered(2);
        let replacement = GridDocument::filled(2, 2, 0);

        store.save(&sample_document(), &id).expect("first save");
        store.save(&replacement, &id).expect("second save");

        assert_eq!(store.load(&id).expect("reload"), replacement);
        assert!(!staging_path(&store.path_for(&id)).exists());
    }

    #[test]
    fn load_or_initialize_copies_default_for_unknown_name() {
        let temp = TempDir::new().expect("temp");
        let store = LevelStore::new(temp.path());
        let default_id = LevelId::named(DEFAULT_LEVEL_NAME).expect("default id");
        store.save(&sample_document(), &default_id).expect("seed default");
        let id = LevelId::named("nonexistent").expect("id");

        let doc = store.load_or_initialize(&id, &default_id).expect("initialize");

        assert_eq!(doc, sample_document());
        assert!(store.exists(&id));
        assert_eq!(store.load(&id).expect("reload"), sample_document());
    }

    #[test]
    fn load_or_initialize_keeps_existing_document() {
        let temp = TempDir::new().expect("temp");
        let store = LevelStore::new(temp.path());
        let default_id = LevelId::numbered(0);
        let id = LevelId::numbered(2);
        store.save(&sample_document(), &default_id).expect("seed default");
        let existing = GridDocument::filled(2, 2, 1);
        store.save(&existing, &id).expect("seed existing");

        let doc = store.load_or_initialize(&id, &default_id).expect("load");

        assert_eq!(doc, existing);
    }

    #[test]
    fn load_or_initialize_without_default_is_not_found() {
        let temp = TempDir::new().expect("temp");
        let store = LevelStore::new(temp.path());

        let err = store
            .load_or_initialize(&LevelId::numbered(5), &LevelId::numbered(0))
            .expect_err("no default");

        assert!(err.is_not_found());
        assert!(!store.exists(&LevelId::numbered(5)));
    }

    #[test]
    fn identifiers_reject_paths_and_parse_numbers() {
        assert!(LevelId::named("").is_err());
        assert!(LevelId::named("../escape").is_err());
        assert!(LevelId::named("a/b").is_err());
        assert_eq!(LevelId::named("world_data12").expect("id").number(), Some(12));
        assert_eq!(LevelId::named("world_data").expect("id").number(), None);
        assert_eq!(LevelId::named("castle").expect("id").number(), None);
    }

    #[test]
    fn max_levels_is_highest_numbered_level_minus_one() {
        let temp = TempDir::new().expect("temp");
        let store = LevelStore::new(temp.path());
        for number in [0, 1, 2, 3] {
            store
                .save(&sample_document(), &LevelId::numbered(number))
                .expect("seed");
        }
        store
            .save(&sample_document(), &LevelId::named("sandbox").expect("id"))
            .expect("seed named");
        fs::write(temp.path().join("notes.txt"), "ignored").expect("write notes");

        assert_eq!(store.numbered_levels().expect("scan"), vec![0, 1, 2, 3]);
        assert_eq!(store.discover_max_levels().expect("discover"), 2);
    }
}
