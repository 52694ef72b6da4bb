//! Credential and identity persistence shared by the gateway and the session.
//!
//! Identity and credential are separate, non-atomic writes; readers must check
//! both before treating a session as authenticated.

use domain::{Credential, Identity};
use tracing::debug;

use common::AppResult;

use crate::keys::StorageKey;
use crate::store::{PersistedStore, StoreExt};

/// Load the stored credential. An empty access token counts as absent.
pub fn load_credential(store: &dyn PersistedStore) -> Option<Credential> {
    let access = store.get_string(StorageKey::Token).filter(|t| !t.is_empty())?;
    let refresh = store
        .get_string(StorageKey::RefreshToken)
        .filter(|t| !t.is_empty());
    Some(Credential::new(access, refresh))
}

/// Persist both tokens. A credential without a refresh token removes any stale one.
pub fn save_credential(store: &dyn PersistedStore, credential: &Credential) -> AppResult<()> {
    store.set_json(StorageKey::Token, credential.access_token())?;
    match credential.refresh_token() {
        Some(refresh) => store.set_json(StorageKey::RefreshToken, refresh)?,
        None => store.remove(StorageKey::RefreshToken)?,
    }
    debug!("Stored credential (demo: {})", credential.is_demo());
    Ok(())
}

/// Replace only the access token, as done after a successful refresh.
pub fn save_access_token(store: &dyn PersistedStore, access: &str) -> AppResult<()> {
    store.set_json(StorageKey::Token, access)
}

/// Drop both tokens, keeping everything else.
pub fn clear_credential(store: &dyn PersistedStore) -> AppResult<()> {
    store.remove(StorageKey::Token)?;
    store.remove(StorageKey::RefreshToken)
}

pub fn load_identity(store: &dyn PersistedStore) -> Option<Identity> {
    store.get_json(StorageKey::User)
}

pub fn save_identity(store: &dyn PersistedStore, identity: &Identity) -> AppResult<()> {
    store.set_json(StorageKey::User, identity)
}
