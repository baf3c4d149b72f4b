//! File-backed key-value store
//!
//! Stores each key as `<key>.json` in a directory, by default the
//! XDG-compliant cache directory (`~/.cache/fplwatch/` on Linux).

use directories::ProjectDirs;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{KeyValueStore, StoreError};

/// Persists values as one JSON file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory where files are stored
    dir: PathBuf,
}

impl FileStore {
    /// Creates a new FileStore using the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        default_cache_dir().map(|dir| Self { dir })
    }

    /// Creates a new FileStore rooted at a custom directory
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path of the file backing `key`
    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    /// Ensures the directory exists
    fn ensure_dir(&self, key: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            key: key.to_string(),
            source,
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        self.ensure_dir(key)?;
        fs::write(path, value).map_err(|source| StoreError::Io {
            key: key.to_string(),
            source,
        })
    }
}

/// `~/.cache/fplwatch/` or the platform equivalent
pub fn default_cache_dir() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "fplwatch")?;
    Some(project_dirs.cache_dir().to_path_buf())
}
