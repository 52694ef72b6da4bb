//! Durable store kept as one JSON document on disk.
//!
//! The document maps full (namespaced) keys to JSON values, so several
//! namespaces can share one file. Every write replaces the file atomically
//! through a sibling temp file and a rename.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use common::{AppError, AppResult};

use crate::keys::{in_namespace, StorageKey};
use crate::store::PersistedStore;

type Document = BTreeMap<String, Value>;

/// File-backed persisted store.
pub struct FileStore {
    path: PathBuf,
    namespace: String,
    // Loaded lazily on first access
    document: Mutex<Option<Document>>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            namespace: namespace.into(),
            document: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` on the loaded document; persist when it reports a change.
    ///
    /// Changes are made on a copy that replaces the cached document only once
    /// it is on disk, so a failed write leaves memory and file in agreement.
    fn with_document<T>(&self, f: impl FnOnce(&mut Document) -> (T, bool)) -> AppResult<T> {
        let mut guard = self.document.lock();
        if guard.is_none() {
            *guard = Some(load(&self.path)?);
        }
        let cached = guard
            .as_ref()
            .ok_or_else(|| AppError::internal("storage document not loaded"))?;

        let mut draft = cached.clone();
        let (result, changed) = f(&mut draft);
        if changed {
            save(&self.path, &draft)?;
            *guard = Some(draft);
        }
        Ok(result)
    }
}

impl PersistedStore for FileStore {
    fn get(&self, key: StorageKey) -> AppResult<Option<Value>> {
        let full_key = key.namespaced(&self.namespace);
        self.with_document(|doc| (doc.get(&full_key).cloned(), false))
    }

    fn set(&self, key: StorageKey, value: Value) -> AppResult<()> {
        let full_key = key.namespaced(&self.namespace);
        self.with_document(|doc| {
            doc.insert(full_key, value);
            ((), true)
        })
    }

    fn remove(&self, key: StorageKey) -> AppResult<()> {
        let full_key = key.namespaced(&self.namespace);
        self.with_document(|doc| {
            let removed = doc.remove(&full_key).is_some();
            ((), removed)
        })
    }

    fn clear_all(&self) -> AppResult<()> {
        let namespace = self.namespace.clone();
        self.with_document(|doc| {
            let before = doc.len();
            doc.retain(|full_key, _| !in_namespace(full_key, &namespace));
            ((), doc.len() != before)
        })
    }

    fn namespace(&self) -> String {
        self.namespace.clone()
    }
}

/// Read the document. A missing file is empty; an unparseable one is
/// treated as empty so a corrupt store never locks the user out.
fn load(path: &Path) -> AppResult<Document> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No storage file at {}, starting empty", path.display());
            return Ok(Document::new());
        }
        Err(e) => {
            return Err(AppError::storage(format!(
                "failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };

    if raw.trim().is_empty() {
        return Ok(Document::new());
    }

    match serde_json::from_str(&raw) {
        Ok(document) => Ok(document),
        Err(e) => {
            warn!("Storage file {} is corrupt ({}), starting empty", path.display(), e);
            Ok(Document::new())
        }
    }
}

fn save(path: &Path, document: &Document) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::storage(format!("failed to create {}: {}", parent.display(), e))
        })?;
    }

    let json = serde_json::to_string_pretty(document)?;
    let tmp = temp_path(path);
    fs::write(&tmp, json)
        .map_err(|e| AppError::storage(format!("failed to write {}: {}", tmp.display(), e)))?;
    fs::rename(&tmp, path).map_err(|e| {
        AppError::storage(format!("failed to replace {}: {}", path.display(), e))
    })?;

    debug!("Persisted {} keys to {}", document.len(), path.display());
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "storage.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
