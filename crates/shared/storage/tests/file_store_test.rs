//! File store integration tests.

use std::fs;

use serde_json::json;

use domain::Identity;
use storage::{FileStore, PersistedStore, StorageKey, StoreExt};

#[test]
fn test_missing_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("store.json"), "app");

    assert!(store.get(StorageKey::User).unwrap().is_none());
    assert!(!store.path().exists());
}

#[test]
fn test_values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("store.json");

    let identity = Identity::for_login("reopen@example.com");
    {
        let store = FileStore::new(&path, "app");
        store.set_json(StorageKey::User, &identity).unwrap();
        store.set_json(StorageKey::Token, "tok").unwrap();
    }

    let reopened = FileStore::new(&path, "app");
    assert_eq!(reopened.get_json::<Identity>(StorageKey::User), Some(identity));
    assert_eq!(reopened.get_string(StorageKey::Token).as_deref(), Some("tok"));
    assert!(!dir.path().join("nested").join("store.json.tmp").exists());
}

#[test]
fn test_corrupt_file_reads_as_empty_and_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    fs::write(&path, "{ this is not json").unwrap();

    let store = FileStore::new(&path, "app");
    assert!(store.get(StorageKey::Token).unwrap().is_none());

    store.set_json(StorageKey::Token, "fresh").unwrap();
    let reopened = FileStore::new(&path, "app");
    assert_eq!(reopened.get_string(StorageKey::Token).as_deref(), Some("fresh"));
}

#[test]
fn test_clear_all_keeps_other_namespaces() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let ours = FileStore::new(&path, "app");
    ours.set_json(StorageKey::Token, "a").unwrap();
    ours.set_json(StorageKey::SavedSearches, &json!([{"query": "bike"}])).unwrap();

    // Written by another tenant of the same file
    let theirs = FileStore::new(&path, "other");
    theirs.set_json(StorageKey::Token, "b").unwrap();

    // Fresh handle so the document includes both tenants' writes
    let ours = FileStore::new(&path, "app");
    ours.clear_all().unwrap();

    let check = FileStore::new(&path, "other");
    assert_eq!(check.get_string(StorageKey::Token).as_deref(), Some("b"));
    let check = FileStore::new(&path, "app");
    assert!(check.get(StorageKey::Token).unwrap().is_none());
    assert!(check.get(StorageKey::SavedSearches).unwrap().is_none());
}

#[test]
fn test_document_uses_namespaced_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let store = FileStore::new(&path, "evolutionMarket");
    store.set_json(StorageKey::RefreshToken, "r").unwrap();

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["evolutionMarket:refresh-token"], json!("r"));
}

#[test]
fn test_failed_write_leaves_cache_matching_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let store = FileStore::new(&path, "app");
    store.set(StorageKey::Token, json!("old")).unwrap();

    // A directory in the temp file's place makes every save fail
    let tmp = dir.path().join("storage.json.tmp");
    fs::create_dir(&tmp).unwrap();

    assert!(store.set(StorageKey::Token, json!("abc")).is_err());
    assert_eq!(store.get_string(StorageKey::Token).as_deref(), Some("old"));

    assert!(store.clear_all().is_err());
    assert_eq!(store.get_string(StorageKey::Token).as_deref(), Some("old"));

    let fresh = FileStore::new(&path, "app");
    assert_eq!(fresh.get_string(StorageKey::Token).as_deref(), Some("old"));

    fs::remove_dir(&tmp).unwrap();
    store.set(StorageKey::Token, json!("abc")).unwrap();
    assert_eq!(store.get_string(StorageKey::Token).as_deref(), Some("abc"));
}
