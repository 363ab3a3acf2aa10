use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use dashmap::DashMap;

/// Key of the block map blob.
pub const SCHEDULE_KEY: &str = "timetable_schedule";
/// Key of the category list blob.
pub const CATEGORIES_KEY: &str = "timetable_categories";

#[derive(Debug)]
pub enum StoreError {
    InvalidKey(String),
    Io(io::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::InvalidKey(k) => write!(f, "invalid store key: {k:?}"),
            StoreError::Io(e) => write!(f, "store I/O error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

/// Key-value persistence port. Values are JSON text.
///
/// Callers treat every error as "absent" on load and as a no-op on store,
/// so implementations only need to report, never recover.
pub trait Store {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn store(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: Store + ?Sized> Store for &S {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).load(key)
    }

    fn store(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).store(key, value)
    }
}

impl<S: Store + ?Sized> Store for std::sync::Arc<S> {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).load(key)
    }

    fn store(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).store(key, value)
    }
}

// ── In-memory ────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw value under `key`, for inspection.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|e| e.value().clone())
    }
}

impl Store for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get(key))
    }

    fn store(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ── File-backed ──────────────────────────────────────────

/// One `<key>.json` file per key inside a data directory.
///
/// Writes go to `<key>.json.tmp`, are fsynced, then renamed over the
/// target, so a crash leaves either the old or the new value.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        // Keys become file names; keep them to a safe alphabet.
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Store for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let tmp_path = path.with_extension("json.tmp");
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(value.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}
