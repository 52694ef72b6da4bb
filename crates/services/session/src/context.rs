//! Session context - owns the in-memory identity and its lifecycle.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::json;
use tracing::{debug, info, warn};

use common::{AppError, AppResult, ClientConfig};
use domain::{
    Credential, Identity, IdentityPatch, LoginRequest, PasswordChangeRequest, RegisterRequest,
};
use gateway_lib::{ApiGateway, Endpoint, RequestOptions};
use storage::{
    load_credential, load_identity, save_credential, save_identity, FileStore, PersistedStore,
};

use crate::reset::SessionResetter;
use crate::status::SessionStatus;

#[derive(Debug)]
struct SessionState {
    status: SessionStatus,
    identity: Option<Identity>,
}

/// Shared core reachable from both the context handle and the reset handler.
pub(crate) struct SessionCore {
    state: RwLock<SessionState>,
    store: Arc<dyn PersistedStore>,
    gateway: Arc<ApiGateway>,
    config: ClientConfig,
}

impl SessionCore {
    /// Read identity and credential from the store. Both must be present.
    pub(crate) fn restore_cached(&self) -> SessionStatus {
        let identity = load_identity(self.store.as_ref());
        let credential = load_credential(self.store.as_ref());

        let mut state = self.state.write();
        match (identity, credential) {
            (Some(identity), Some(_)) => {
                debug!("Restored cached session for {}", identity.email);
                state.identity = Some(identity);
                state.status = SessionStatus::Authenticated;
            }
            (identity, credential) => {
                if identity.is_some() != credential.is_some() {
                    warn!("Discarding partial session (identity and credential must both be stored)");
                }
                state.identity = None;
                state.status = SessionStatus::Unauthenticated;
            }
        }
        state.status
    }

    /// Drop the in-memory identity and re-run restore.
    pub(crate) fn force_reset(&self) {
        {
            let mut state = self.state.write();
            state.identity = None;
            state.status = SessionStatus::Initializing;
        }
        let status = self.restore_cached();
        info!("Session reset, now {}", status);
    }

    fn establish(&self, identity: Identity, credential: &Credential) -> AppResult<()> {
        // Two separate writes; restore only trusts the pair
        save_identity(self.store.as_ref(), &identity)?;
        save_credential(self.store.as_ref(), credential)?;

        let mut state = self.state.write();
        state.identity = Some(identity);
        state.status = SessionStatus::Authenticated;
        Ok(())
    }

    fn teardown(&self) -> AppResult<()> {
        {
            let mut state = self.state.write();
            state.identity = None;
            state.status = SessionStatus::Unauthenticated;
        }
        // Everything in this client's namespace goes, not only the session keys
        self.store.clear_all()
    }
}

/// Explicit session object injected into consumers.
///
/// Mutating operations are expected to be awaited one at a time; the state
/// lock is never held across an `.await`.
#[derive(Clone)]
pub struct SessionContext {
    core: Arc<SessionCore>,
}

impl SessionContext {
    /// Create a context in `Initializing` and register its reset handler on
    /// the gateway.
    pub fn new(config: ClientConfig, store: Arc<dyn PersistedStore>, gateway: Arc<ApiGateway>) -> Self {
        let core = Arc::new(SessionCore {
            state: RwLock::new(SessionState {
                status: SessionStatus::Initializing,
                identity: None,
            }),
            store,
            gateway,
            config,
        });

        core.gateway
            .reset_hook()
            .register(Arc::new(SessionResetter::new(&core)));

        Self { core }
    }

    /// Wire a file-backed store and an HTTP gateway from configuration.
    pub fn open(config: ClientConfig) -> AppResult<Self> {
        let store: Arc<dyn PersistedStore> = Arc::new(FileStore::new(
            config.storage_path.clone(),
            config.storage_namespace.clone(),
        ));
        let gateway = Arc::new(ApiGateway::from_config(&config, store.clone())?);
        Ok(Self::new(config, store, gateway))
    }

    /// Leave `Initializing` by restoring the cached session.
    ///
    /// With `revalidate_on_restore` the cached identity is checked against the
    /// profile endpoint; a rejected credential ends the session, an
    /// unreachable server keeps it.
    pub async fn initialize(&self) -> SessionStatus {
        let status = self.core.restore_cached();
        if !status.is_authenticated() || !self.core.config.revalidate_on_restore {
            return status;
        }

        match self.refresh_profile().await {
            Ok(_) => {}
            Err(AppError::Unauthorized) => {
                warn!("Cached session rejected by server");
                if let Err(e) = self.core.teardown() {
                    warn!("Failed to clear rejected session: {}", e);
                }
            }
            Err(e) if e.is_connectivity() => {
                debug!("Server unreachable, keeping cached identity");
            }
            Err(e) => warn!("Profile revalidation failed: {}", e),
        }
        self.status()
    }

    /// Demo login: validates input, then synthesizes identity and credential.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<Identity> {
        LoginRequest::new(email, password).check()?;

        tokio::time::sleep(self.core.config.login_latency()).await;

        let identity = Identity::for_login(email);
        self.core.establish(identity.clone(), &Credential::demo())?;
        info!("Logged in as {}", identity.email);
        Ok(identity)
    }

    /// Demo registration: like [`login`](Self::login) but keeps the supplied name.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> AppResult<Identity> {
        RegisterRequest::new(name, email, password).check()?;

        tokio::time::sleep(self.core.config.register_latency()).await;

        let identity = Identity::for_registration(name, email);
        self.core.establish(identity.clone(), &Credential::demo())?;
        info!("Registered {}", identity.email);
        Ok(identity)
    }

    /// End the session. Remote failure is logged; local teardown always happens.
    pub async fn logout(&self) -> AppResult<()> {
        let refresh = load_credential(self.core.store.as_ref())
            .and_then(|c| c.refresh_token().map(str::to_string));
        let body = match refresh {
            Some(refresh) => json!({ "refresh": refresh }),
            None => json!({}),
        };

        match self
            .core
            .gateway
            .request(Endpoint::Logout, RequestOptions::post(body))
            .await
        {
            Ok(response) if !response.is_success() => {
                warn!("Remote logout returned status {}", response.status)
            }
            Ok(_) => debug!("Remote logout acknowledged"),
            Err(e) => warn!("Remote logout failed: {}", e),
        }

        self.core.teardown()?;
        info!("Logged out");
        Ok(())
    }

    /// Merge a patch into the current identity. No-op when unauthenticated.
    pub fn update_identity(&self, patch: IdentityPatch) -> AppResult<Option<Identity>> {
        let current = {
            let state = self.core.state.read();
            match (&state.status, &state.identity) {
                (SessionStatus::Authenticated, Some(identity)) => identity.clone(),
                _ => {
                    debug!("Ignoring identity update while unauthenticated");
                    return Ok(None);
                }
            }
        };

        let updated = current.merged(patch);
        save_identity(self.core.store.as_ref(), &updated)?;
        self.core.state.write().identity = Some(updated.clone());
        Ok(Some(updated))
    }

    /// Reload the identity from the profile endpoint.
    ///
    /// A body that is not an identity (such as the simulated success answer)
    /// keeps the cached one. No-op when unauthenticated.
    pub async fn refresh_profile(&self) -> AppResult<Option<Identity>> {
        if !self.is_authenticated() {
            return Ok(None);
        }

        let response = self
            .core
            .gateway
            .request(Endpoint::Profile, RequestOptions::get())
            .await?
            .error_for_status()?;

        let fetched = match response.json::<Identity>() {
            Ok(identity) => identity,
            Err(_) => {
                debug!("Profile response carried no identity, keeping cached one");
                return Ok(self.identity());
            }
        };

        // The session may have ended while the request was in flight
        if !self.is_authenticated() {
            return Ok(None);
        }
        save_identity(self.core.store.as_ref(), &fetched)?;
        self.core.state.write().identity = Some(fetched.clone());
        Ok(Some(fetched))
    }

    /// Change the account password on the server.
    pub async fn change_password(&self, current: &str, new: &str, confirm: &str) -> AppResult<()> {
        let request = PasswordChangeRequest::new(current, new, confirm);
        request.check()?;
        if !self.is_authenticated() {
            return Err(AppError::Unauthorized);
        }

        let body = serde_json::to_value(&request)?;
        self.core
            .gateway
            .request(Endpoint::PasswordChange, RequestOptions::post(body))
            .await?
            .error_for_status()?;

        info!("Password changed");
        Ok(())
    }

    pub fn identity(&self) -> Option<Identity> {
        self.core.state.read().identity.clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.core.state.read().status
    }

    pub fn is_authenticated(&self) -> bool {
        self.status().is_authenticated()
    }

    /// True only while the cached session has not been read yet.
    pub fn is_loading(&self) -> bool {
        self.status() == SessionStatus::Initializing
    }

    /// Gateway shared with this session, for non-session calls.
    pub fn gateway(&self) -> Arc<ApiGateway> {
        self.core.gateway.clone()
    }

    pub fn store(&self) -> Arc<dyn PersistedStore> {
        self.core.store.clone()
    }
}
