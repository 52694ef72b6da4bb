//! Persisted Store - namespaced key/value persistence for the session client.
//!
//! Two backends implement [`PersistedStore`]:
//! - [`MemoryStore`]: process-lifetime storage, used by tests and ephemeral sessions
//! - [`FileStore`]: a JSON document on disk, the durable equivalent of browser storage
//!
//! Typed reads go through [`StoreExt`], which treats corrupt values as absent.

pub mod file;
pub mod keys;
pub mod memory;
pub mod session_keys;
pub mod store;

pub use file::FileStore;
pub use keys::StorageKey;
pub use memory::MemoryStore;
pub use session_keys::{
    clear_credential, load_credential, load_identity, save_access_token, save_credential,
    save_identity,
};
pub use store::{PersistedStore, StoreExt};
