//! Persisted store abstraction.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::warn;

use common::AppResult;

use crate::keys::StorageKey;

/// Durable key/value storage scoped to one namespace.
///
/// Operations are synchronous. Implementations must only touch keys of their
/// own namespace.
pub trait PersistedStore: Send + Sync {
    /// Read a value, `None` when absent.
    fn get(&self, key: StorageKey) -> AppResult<Option<Value>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: StorageKey, value: Value) -> AppResult<()>;

    /// Remove a value. Removing an absent key is not an error.
    fn remove(&self, key: StorageKey) -> AppResult<()>;

    /// Remove every key of this store's namespace.
    fn clear_all(&self) -> AppResult<()>;

    /// Namespace prefix applied to every key.
    fn namespace(&self) -> String;
}

/// Typed access on top of [`PersistedStore`].
pub trait StoreExt {
    /// Read and decode a value. Missing, unreadable or corrupt values are `None`.
    fn get_json<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T>;

    /// Encode and write a value.
    fn set_json<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> AppResult<()>;

    /// Read a plain string value.
    fn get_string(&self, key: StorageKey) -> Option<String> {
        self.get_json::<String>(key)
    }

    /// True when a non-empty string is stored under `key`.
    fn has_string(&self, key: StorageKey) -> bool {
        self.get_string(key).is_some_and(|v| !v.is_empty())
    }
}

impl<S: PersistedStore + ?Sized> StoreExt for S {
    fn get_json<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        let value = match self.get(key) {
            Ok(Some(value)) => value,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read {} from storage: {}", key, e);
                return None;
            }
        };

        match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Ignoring corrupt value for {}: {}", key, e);
                None
            }
        }
    }

    fn set_json<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> AppResult<()> {
        let value = serde_json::to_value(value)?;
        self.set(key, value)
    }
}
