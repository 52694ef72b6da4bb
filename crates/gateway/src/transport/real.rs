//! Network transport with one-shot credential refresh.
//!
//! Pipeline per call: attempt -> (401) -> refresh -> retry once.
//! The retry's response is returned whatever its status; there is no loop.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use url::Url;

use common::{AppError, AppResult};
use storage::{clear_credential, save_access_token, PersistedStore, StorageKey, StoreExt};

use super::{ResetHook, TransportKind, TransportStrategy};
use crate::http::HttpBackend;
use crate::request::{ApiResponse, Method, RequestDescriptor};

/// Result of asking the server for a new access token.
enum RefreshOutcome {
    Renewed(String),
    Rejected,
}

/// Dispatches over HTTP and recovers once from an expired access token.
pub struct RealTransport {
    backend: Arc<dyn HttpBackend>,
    store: Arc<dyn PersistedStore>,
    refresh_url: Url,
    reset: Arc<ResetHook>,
}

impl RealTransport {
    pub fn new(
        backend: Arc<dyn HttpBackend>,
        store: Arc<dyn PersistedStore>,
        refresh_url: Url,
        reset: Arc<ResetHook>,
    ) -> Self {
        Self {
            backend,
            store,
            refresh_url,
            reset,
        }
    }

    async fn attempt(&self, request: &RequestDescriptor) -> AppResult<ApiResponse> {
        self.backend.send(request).await
    }

    async fn refresh(&self) -> AppResult<RefreshOutcome> {
        let Some(refresh_token) = self
            .store
            .get_string(StorageKey::RefreshToken)
            .filter(|t| !t.is_empty())
        else {
            debug!("No refresh token stored");
            return Ok(RefreshOutcome::Rejected);
        };

        let request = RequestDescriptor::new(Method::Post, self.refresh_url.clone())
            .with_json(json!({ "refresh": refresh_token }));
        // Connectivity errors propagate; only a server answer counts as rejection
        let response = self.backend.send(&request).await?;
        if !response.is_success() {
            warn!("Token refresh rejected with status {}", response.status);
            return Ok(RefreshOutcome::Rejected);
        }

        let Some(access) = response
            .body
            .get("access")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
        else {
            warn!("Token refresh response carried no access token");
            return Ok(RefreshOutcome::Rejected);
        };

        save_access_token(self.store.as_ref(), access)?;
        // Servers that rotate refresh tokens send the new one alongside
        if let Some(rotated) = response.body.get("refresh").and_then(Value::as_str) {
            self.store.set_json(StorageKey::RefreshToken, rotated)?;
        }

        info!("Access token refreshed");
        Ok(RefreshOutcome::Renewed(access.to_string()))
    }

    async fn retry_once(&self, request: RequestDescriptor, access: &str) -> AppResult<ApiResponse> {
        let retry = request.with_bearer(access);
        self.backend.send(&retry).await
    }

    fn force_reset(&self) -> AppResult<()> {
        warn!("Credential refresh failed, clearing credentials and resetting session");
        clear_credential(self.store.as_ref())?;
        self.reset.trigger();
        Ok(())
    }
}

#[async_trait]
impl TransportStrategy for RealTransport {
    async fn execute(&self, request: RequestDescriptor) -> AppResult<ApiResponse> {
        let response = self.attempt(&request).await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        debug!("{} {} returned 401, attempting refresh", request.method, request.url);
        match self.refresh().await? {
            RefreshOutcome::Renewed(access) => self.retry_once(request, &access).await,
            RefreshOutcome::Rejected => {
                self.force_reset()?;
                Err(AppError::Unauthorized)
            }
        }
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Real
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockHttpBackend;
    use crate::transport::MockResetHandler;
    use domain::Credential;
    use mockall::Sequence;
    use storage::{load_credential, save_credential, MemoryStore};

    const API: &str = "http://api.test/api/v1/products/";
    const REFRESH: &str = "http://api.test/api/v1/auth/token/refresh/";

    fn store_with(access: &str, refresh: Option<&str>) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new("test"));
        save_credential(
            store.as_ref(),
            &Credential::new(access, refresh.map(str::to_string)),
        )
        .unwrap();
        store
    }

    fn request(access: &str) -> RequestDescriptor {
        RequestDescriptor::new(Method::Get, Url::parse(API).unwrap()).with_bearer(access)
    }

    fn transport(
        backend: MockHttpBackend,
        store: Arc<MemoryStore>,
        resets: usize,
    ) -> RealTransport {
        let mut handler = MockResetHandler::new();
        handler.expect_reset().times(resets).return_const(());
        let hook = Arc::new(ResetHook::new());
        hook.register(Arc::new(handler));

        RealTransport::new(Arc::new(backend), store, Url::parse(REFRESH).unwrap(), hook)
    }

    fn is_api_with(req: &RequestDescriptor, bearer: &str) -> bool {
        req.url.as_str() == API && req.authorization() == Some(bearer)
    }

    fn is_refresh(req: &RequestDescriptor) -> bool {
        req.url.as_str() == REFRESH
    }

    #[tokio::test]
    async fn test_non_401_passes_through_unchanged() {
        let mut backend = MockHttpBackend::new();
        backend
            .expect_send()
            .times(1)
            .returning(|_| Ok(ApiResponse::new(500, json!({"detail": "boom"}))));

        let store = store_with("access", Some("refresh"));
        let transport = transport(backend, store, 0);

        let response = transport.execute(request("access")).await.unwrap();
        assert_eq!(response.status, 500);
        assert_eq!(response.body, json!({"detail": "boom"}));
    }

    #[tokio::test]
    async fn test_refresh_then_retry_once_with_new_token() {
        let mut seq = Sequence::new();
        let mut backend = MockHttpBackend::new();
        backend
            .expect_send()
            .withf(|req| is_api_with(req, "Bearer old"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ApiResponse::new(401, Value::Null)));
        backend
            .expect_send()
            .withf(|req| {
                is_refresh(req)
                    && req.body == Some(json!({"refresh": "refresh-1"}))
                    && req.authorization().is_none()
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ApiResponse::new(200, json!({"access": "new"}))));
        backend
            .expect_send()
            .withf(|req| is_api_with(req, "Bearer new"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ApiResponse::new(200, json!({"results": []}))));

        let store = store_with("old", Some("refresh-1"));
        let transport = transport(backend, store.clone(), 0);

        let response = transport.execute(request("old")).await.unwrap();
        assert_eq!(response.status, 200);

        let stored = load_credential(store.as_ref()).unwrap();
        assert_eq!(stored.access_token(), "new");
        assert_eq!(stored.refresh_token(), Some("refresh-1"));
    }

    #[tokio::test]
    async fn test_retry_401_is_returned_without_second_refresh() {
        let mut backend = MockHttpBackend::new();
        backend
            .expect_send()
            .withf(|req| is_api_with(req, "Bearer old"))
            .times(1)
            .returning(|_| Ok(ApiResponse::new(401, Value::Null)));
        backend
            .expect_send()
            .withf(is_refresh)
            .times(1)
            .returning(|_| Ok(ApiResponse::new(200, json!({"access": "new"}))));
        backend
            .expect_send()
            .withf(|req| is_api_with(req, "Bearer new"))
            .times(1)
            .returning(|_| Ok(ApiResponse::new(401, Value::Null)));

        let store = store_with("old", Some("refresh-1"));
        let transport = transport(backend, store, 0);

        let response = transport.execute(request("old")).await.unwrap();
        assert_eq!(response.status, 401);
    }

    #[tokio::test]
    async fn test_rejected_refresh_clears_tokens_and_resets() {
        let mut backend = MockHttpBackend::new();
        backend
            .expect_send()
            .withf(|req| is_api_with(req, "Bearer old"))
            .times(1)
            .returning(|_| Ok(ApiResponse::new(401, Value::Null)));
        backend
            .expect_send()
            .withf(is_refresh)
            .times(1)
            .returning(|_| Ok(ApiResponse::new(401, json!({"detail": "Token is invalid"}))));

        let store = store_with("old", Some("refresh-1"));
        let transport = transport(backend, store.clone(), 1);

        let err = transport.execute(request("old")).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
        assert!(store.get(StorageKey::Token).unwrap().is_none());
        assert!(store.get(StorageKey::RefreshToken).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_refresh_token_skips_refresh_call() {
        let mut backend = MockHttpBackend::new();
        backend
            .expect_send()
            .withf(|req| is_api_with(req, "Bearer old"))
            .times(1)
            .returning(|_| Ok(ApiResponse::new(401, Value::Null)));

        let store = store_with("old", None);
        let transport = transport(backend, store.clone(), 1);

        assert!(transport.execute(request("old")).await.is_err());
        assert!(load_credential(store.as_ref()).is_none());
    }

    #[tokio::test]
    async fn test_refresh_without_access_field_is_rejection() {
        let mut backend = MockHttpBackend::new();
        backend
            .expect_send()
            .withf(|req| is_api_with(req, "Bearer old"))
            .times(1)
            .returning(|_| Ok(ApiResponse::new(401, Value::Null)));
        backend
            .expect_send()
            .withf(is_refresh)
            .times(1)
            .returning(|_| Ok(ApiResponse::new(200, json!({"unexpected": true}))));

        let store = store_with("old", Some("r"));
        let transport = transport(backend, store, 1);

        assert!(matches!(
            transport.execute(request("old")).await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_rotated_refresh_token_is_stored() {
        let mut backend = MockHttpBackend::new();
        backend
            .expect_send()
            .withf(|req| is_api_with(req, "Bearer old"))
            .times(1)
            .returning(|_| Ok(ApiResponse::new(401, Value::Null)));
        backend
            .expect_send()
            .withf(is_refresh)
            .times(1)
            .returning(|_| Ok(ApiResponse::new(200, json!({"access": "new", "refresh": "r2"}))));
        backend
            .expect_send()
            .withf(|req| is_api_with(req, "Bearer new"))
            .times(1)
            .returning(|_| Ok(ApiResponse::new(204, Value::Null)));

        let store = store_with("old", Some("r1"));
        let transport = transport(backend, store.clone(), 0);

        transport.execute(request("old")).await.unwrap();
        assert_eq!(
            load_credential(store.as_ref()).unwrap().refresh_token(),
            Some("r2")
        );
    }

    #[tokio::test]
    async fn test_connectivity_error_is_not_retried() {
        let mut backend = MockHttpBackend::new();
        backend
            .expect_send()
            .times(1)
            .returning(|_| Err(AppError::unreachable()));

        let store = store_with("old", Some("r"));
        let transport = transport(backend, store.clone(), 0);

        let err = transport.execute(request("old")).await.unwrap_err();
        assert!(err.is_connectivity());
        assert!(load_credential(store.as_ref()).is_some());
    }
}
