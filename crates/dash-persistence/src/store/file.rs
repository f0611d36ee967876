//! Single-file JSON store.
//!
//! The whole store is one document:
//!
//! ```text
//! {
//!   "schemaVersion": 1,
//!   "entries": { "<key>": <json>, ... }
//! }
//! ```
//!
//! Every mutation rewrites the document with an atomic write (temp file +
//! rename), so a crash never leaves a half-written store behind.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::KeyValueStore;
use crate::error::{PersistenceError, Result};

/// Newest store layout this version reads and writes.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreDocument {
    schema_version: u32,
    #[serde(default)]
    entries: BTreeMap<String, Value>,
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store; it is
    /// created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            read_document(&path)?
        } else {
            tracing::debug!("No store at {}, starting empty", path.display());
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn flush(&self) -> Result<()> {
        let document = StoreDocument {
            schema_version: CURRENT_SCHEMA_VERSION,
            entries: self.entries.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&document)
            .map_err(|e| PersistenceError::serialize("store", e))?;
        write_atomic(&self.path, &bytes)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

fn read_document(path: &Path) -> Result<BTreeMap<String, Value>> {
    let bytes = fs::read(path).map_err(|e| PersistenceError::io("read", path, e))?;
    let raw: Value =
        serde_json::from_slice(&bytes).map_err(|e| PersistenceError::InvalidFormat {
            path: path.to_path_buf(),
            reason: format!("not valid JSON: {e}"),
        })?;

    let version = raw
        .get("schemaVersion")
        .and_then(Value::as_u64)
        .ok_or_else(|| PersistenceError::InvalidFormat {
            path: path.to_path_buf(),
            reason: "missing schemaVersion".to_string(),
        })?;
    let version = u32::try_from(version).unwrap_or(u32::MAX);
    if version > CURRENT_SCHEMA_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: version,
            max_supported: CURRENT_SCHEMA_VERSION,
            path: path.to_path_buf(),
        });
    }

    let document: StoreDocument =
        serde_json::from_value(raw).map_err(|e| PersistenceError::deserialize("store", e))?;
    tracing::info!(
        "Loaded {} store entries from {}",
        document.entries.len(),
        path.display()
    );
    Ok(document.entries)
}

/// Write `bytes` to `path` through a sibling temp file and a rename.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("json.tmp");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| PersistenceError::io("create directory", parent, e))?;
    }

    let mut file =
        File::create(&temp_path).map_err(|e| PersistenceError::io("create", &temp_path, e))?;
    file.write_all(bytes)
        .map_err(|e| PersistenceError::io("write", &temp_path, e))?;
    file.sync_all()
        .map_err(|e| PersistenceError::io("sync", &temp_path, e))?;

    fs::rename(&temp_path, path).map_err(|e| PersistenceError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source: e,
    })?;

    tracing::info!("Saved store to {}", path.display());
    Ok(())
}
