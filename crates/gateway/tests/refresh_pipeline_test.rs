//! Gateway refresh-and-retry behaviour against a scripted backend.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use common::{AppError, AppResult, ClientConfig, TransportMode};
use domain::Credential;
use gateway_lib::{
    ApiGateway, ApiResponse, Endpoint, HttpBackend, RequestDescriptor, RequestOptions,
    ResetHandler,
};
use storage::{load_credential, save_credential, MemoryStore};

/// Replays canned responses in order and records every request.
#[derive(Default)]
struct ScriptedBackend {
    replies: Mutex<VecDeque<AppResult<ApiResponse>>>,
    seen: Mutex<Vec<RequestDescriptor>>,
}

impl ScriptedBackend {
    fn new(replies: Vec<AppResult<ApiResponse>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn seen(&self) -> Vec<RequestDescriptor> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl HttpBackend for ScriptedBackend {
    async fn send(&self, request: &RequestDescriptor) -> AppResult<ApiResponse> {
        self.seen.lock().push(request.clone());
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::internal("no scripted reply left")))
    }
}

#[derive(Default)]
struct CountingReset {
    calls: AtomicUsize,
}

impl ResetHandler for CountingReset {
    fn reset(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn setup(backend: Arc<ScriptedBackend>, credential: Credential) -> (ApiGateway, Arc<MemoryStore>, Arc<CountingReset>) {
    let config = ClientConfig {
        api_base_url: "http://api.test".to_string(),
        transport: TransportMode::Auto,
        ..ClientConfig::default()
    };
    let store = Arc::new(MemoryStore::new("test"));
    save_credential(store.as_ref(), &credential).unwrap();

    let gateway = ApiGateway::with_backend(&config, store.clone(), backend).unwrap();
    let reset = Arc::new(CountingReset::default());
    gateway.reset_hook().register(reset.clone());
    (gateway, store, reset)
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_request_retried_once() {
    let backend = ScriptedBackend::new(vec![
        Ok(ApiResponse::new(401, json!({"detail": "Given token not valid"}))),
        Ok(ApiResponse::new(200, json!({"access": "fresh"}))),
        Ok(ApiResponse::new(201, json!({"id": 42}))),
    ]);
    let (gateway, store, reset) = setup(backend.clone(), Credential::new("stale", Some("refresh".into())));

    let response = gateway
        .request(Endpoint::ProductCreate, RequestOptions::post(json!({"title": "Lamp"})))
        .await
        .unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(reset.calls.load(Ordering::SeqCst), 0);
    assert_eq!(load_credential(store.as_ref()).unwrap().access_token(), "fresh");

    let seen = backend.seen();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0].authorization(), Some("Bearer stale"));
    assert_eq!(seen[1].url.path(), "/api/v1/auth/token/refresh/");
    assert_eq!(seen[1].body, Some(json!({"refresh": "refresh"})));
    // The retry is the original request with only the credential swapped
    assert_eq!(seen[2].authorization(), Some("Bearer fresh"));
    assert_eq!(seen[2].url, seen[0].url);
    assert_eq!(seen[2].body, seen[0].body);
}

#[tokio::test]
async fn test_refresh_failure_clears_tokens_and_triggers_reset() {
    let backend = ScriptedBackend::new(vec![
        Ok(ApiResponse::new(401, Value::Null)),
        Ok(ApiResponse::new(401, json!({"detail": "Token is invalid or expired"}))),
    ]);
    let (gateway, store, reset) = setup(backend.clone(), Credential::new("stale", Some("dead".into())));

    let err = gateway
        .request(Endpoint::MyProducts, RequestOptions::get())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Unauthorized));
    assert_eq!(reset.calls.load(Ordering::SeqCst), 1);
    assert!(load_credential(store.as_ref()).is_none());
    assert_eq!(backend.seen().len(), 2);
}

#[tokio::test]
async fn test_second_401_is_returned_not_retried() {
    let backend = ScriptedBackend::new(vec![
        Ok(ApiResponse::new(401, Value::Null)),
        Ok(ApiResponse::new(200, json!({"access": "fresh"}))),
        Ok(ApiResponse::new(401, Value::Null)),
    ]);
    let (gateway, _store, reset) = setup(backend.clone(), Credential::new("stale", Some("r".into())));

    let response = gateway
        .request(Endpoint::Payments, RequestOptions::get())
        .await
        .unwrap();

    assert_eq!(response.status, 401);
    assert_eq!(reset.calls.load(Ordering::SeqCst), 0);
    assert_eq!(backend.seen().len(), 3);
}

#[tokio::test]
async fn test_sub_resource_request_carries_credential() {
    let backend = ScriptedBackend::new(vec![Ok(ApiResponse::new(200, json!([])))]);
    let (gateway, _store, _reset) = setup(backend.clone(), Credential::new("jwt", None));

    let url = gateway.endpoints().messages("7").unwrap();
    gateway.request_url(url, RequestOptions::get()).await.unwrap();

    let seen = backend.seen();
    assert_eq!(seen[0].url.path(), "/api/v1/chat/conversations/7/messages/");
    assert_eq!(seen[0].authorization(), Some("Bearer jwt"));
}
