//! Configuration store collaborator.
//!
//! The gate reads a single value (the login alias) once per request and never
//! writes it; the settings surface is the only writer. The seam is a small
//! trait so embedders can plug in whatever persistence the host already has.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

pub mod file;

pub use file::FileStore;

/// Key/value configuration persistence.
///
/// `get` must be cheap: it runs once per request cycle. `set` is
/// single-writer (the settings endpoint) and rare.
pub trait ConfigStore: Send + Sync {
    /// Read a value, falling back to `default` when the key is unset.
    fn get(&self, key: &str, default: &str) -> String;

    /// Persist a value.
    ///
    /// # Errors
    /// Returns an error when the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store used by tests and as the default when no state file is
/// configured. Values do not survive a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str, default: &str) -> String {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
