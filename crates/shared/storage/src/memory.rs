//! In-memory store for tab-lifetime sessions and tests.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use common::AppResult;

use crate::keys::{in_namespace, StorageKey};
use crate::store::PersistedStore;

/// Store backed by a shared map. Clones and [`MemoryStore::with_namespace`]
/// views share the same underlying entries.
#[derive(Clone)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Value>>>,
    namespace: String,
}

impl MemoryStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            namespace: namespace.into(),
        }
    }

    /// A view of the same entries under another namespace.
    pub fn with_namespace(&self, namespace: impl Into<String>) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            namespace: namespace.into(),
        }
    }

    /// Number of entries across all namespaces.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl PersistedStore for MemoryStore {
    fn get(&self, key: StorageKey) -> AppResult<Option<Value>> {
        let full_key = key.namespaced(&self.namespace);
        Ok(self.entries.read().get(&full_key).cloned())
    }

    fn set(&self, key: StorageKey, value: Value) -> AppResult<()> {
        let full_key = key.namespaced(&self.namespace);
        self.entries.write().insert(full_key, value);
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> AppResult<()> {
        let full_key = key.namespaced(&self.namespace);
        self.entries.write().remove(&full_key);
        Ok(())
    }

    fn clear_all(&self) -> AppResult<()> {
        let namespace = &self.namespace;
        self.entries
            .write()
            .retain(|full_key, _| !in_namespace(full_key, namespace));
        Ok(())
    }

    fn namespace(&self) -> String {
        self.namespace.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreExt;
    use serde_json::json;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new("app");
        assert!(store.get(StorageKey::Token).unwrap().is_none());

        store.set_json(StorageKey::Token, "abc").unwrap();
        assert_eq!(store.get_string(StorageKey::Token).as_deref(), Some("abc"));

        store.remove(StorageKey::Token).unwrap();
        assert!(store.get_string(StorageKey::Token).is_none());
        // Removing twice is fine
        store.remove(StorageKey::Token).unwrap();
    }

    #[test]
    fn test_clear_all_respects_namespace() {
        let ours = MemoryStore::new("app");
        let theirs = ours.with_namespace("other");

        ours.set_json(StorageKey::User, &json!({"id": "1"})).unwrap();
        ours.set_json(StorageKey::Notifications, &json!([])).unwrap();
        theirs.set_json(StorageKey::User, &json!({"id": "2"})).unwrap();
        assert_eq!(ours.len(), 3);

        ours.clear_all().unwrap();

        assert!(ours.get(StorageKey::User).unwrap().is_none());
        assert!(ours.get(StorageKey::Notifications).unwrap().is_none());
        assert_eq!(theirs.get(StorageKey::User).unwrap(), Some(json!({"id": "2"})));
    }

    #[test]
    fn test_corrupt_value_reads_as_absent() {
        let store = MemoryStore::new("app");
        store.set(StorageKey::Token, json!({"not": "a string"})).unwrap();
        assert!(store.get_string(StorageKey::Token).is_none());
        assert!(!store.has_string(StorageKey::Token));
    }

    #[test]
    fn test_empty_string_is_not_a_value() {
        let store = MemoryStore::new("app");
        store.set_json(StorageKey::Token, "").unwrap();
        assert!(!store.has_string(StorageKey::Token));
    }
}
