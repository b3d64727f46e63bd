//! JSON-file-backed configuration store.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::debug;

use super::ConfigStore;

/// Configuration persisted as a flat JSON object on disk.
///
/// The full map is cached in memory; reads never touch the filesystem after
/// startup, writes rewrite the file and then the cache.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl FileStore {
    /// Open (or initialize) the store at `path`. A missing file starts empty;
    /// it is created on the first `set`.
    ///
    /// # Errors
    /// Returns an error when an existing file cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let values = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read state file: {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Invalid state file: {}", path.display()))?
        } else {
            debug!("State file {} does not exist yet", path.display());
            HashMap::new()
        };

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }
}

impl ConfigStore for FileStore {
    fn get(&self, key: &str, default: &str) -> String {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);

        let mut next = values.clone();
        next.insert(key.to_string(), value.to_string());

        // Write the file first so the cache never claims a value the disk
        // does not have.
        let serialized = serde_json::to_string_pretty(&next)?;
        std::fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write state file: {}", self.path.display()))?;

        *values = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_starts_empty_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("state.json")).unwrap();
        assert_eq!(store.get("login_alias", "myadmin"), "myadmin");
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = FileStore::open(&path).unwrap();
        store.set("login_alias", "secure-area").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("login_alias", "myadmin"), "secure-area");
    }

    #[test]
    fn file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(FileStore::open(&path).is_err());
    }
}
