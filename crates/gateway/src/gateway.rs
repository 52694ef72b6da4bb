//! API gateway: resolves endpoints, attaches credentials and dispatches
//! through the selected transport.

use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use common::{AppResult, ClientConfig, TransportMode};
use domain::{Credential, SearchFilter};
use storage::{load_credential, PersistedStore};

use crate::endpoints::{Endpoint, EndpointTable};
use crate::http::{HttpBackend, ReqwestBackend};
use crate::request::{ApiResponse, RequestDescriptor, RequestOptions};
use crate::transport::{RealTransport, ResetHook, SimulatedTransport, TransportStrategy};

/// Single entry point for remote calls.
pub struct ApiGateway {
    endpoints: EndpointTable,
    store: Arc<dyn PersistedStore>,
    mode: TransportMode,
    simulated: Arc<dyn TransportStrategy>,
    real: Arc<dyn TransportStrategy>,
    reset: Arc<ResetHook>,
}

impl ApiGateway {
    /// Build a gateway that talks HTTP through `reqwest`.
    pub fn from_config(config: &ClientConfig, store: Arc<dyn PersistedStore>) -> AppResult<Self> {
        let backend = Arc::new(ReqwestBackend::new(config.request_timeout())?);
        Self::with_backend(config, store, backend)
    }

    /// Build a gateway over an arbitrary HTTP backend.
    pub fn with_backend(
        config: &ClientConfig,
        store: Arc<dyn PersistedStore>,
        backend: Arc<dyn HttpBackend>,
    ) -> AppResult<Self> {
        let endpoints = EndpointTable::new(&config.api_base_url)?;
        let reset = Arc::new(ResetHook::new());

        let simulated = Arc::new(SimulatedTransport::new(config.simulated_latency()));
        let real = Arc::new(RealTransport::new(
            backend,
            store.clone(),
            endpoints.url(Endpoint::TokenRefresh).clone(),
            reset.clone(),
        ));

        info!(
            "API gateway ready (base: {}, transport: {})",
            endpoints.base(),
            config.transport
        );

        Ok(Self::with_transports(
            endpoints,
            store,
            config.transport,
            simulated,
            real,
            reset,
        ))
    }

    /// Assemble a gateway from already built parts.
    pub fn with_transports(
        endpoints: EndpointTable,
        store: Arc<dyn PersistedStore>,
        mode: TransportMode,
        simulated: Arc<dyn TransportStrategy>,
        real: Arc<dyn TransportStrategy>,
        reset: Arc<ResetHook>,
    ) -> Self {
        Self {
            endpoints,
            store,
            mode,
            simulated,
            real,
            reset,
        }
    }

    pub fn endpoints(&self) -> &EndpointTable {
        &self.endpoints
    }

    pub fn mode(&self) -> TransportMode {
        self.mode
    }

    /// Hook fired when a refresh fails; the session registers its handler here.
    pub fn reset_hook(&self) -> Arc<ResetHook> {
        self.reset.clone()
    }

    /// Call a named endpoint.
    pub async fn request(&self, endpoint: Endpoint, options: RequestOptions) -> AppResult<ApiResponse> {
        let url = self.endpoints.url(endpoint).clone();
        self.request_url(url, options).await
    }

    /// Call an already resolved URL (sub-resources such as `products/{id}/`).
    pub async fn request_url(&self, url: Url, options: RequestOptions) -> AppResult<ApiResponse> {
        let credential = load_credential(self.store.as_ref());
        let request = RequestDescriptor::build(
            url,
            options,
            credential.as_ref().map(Credential::access_token),
        );

        let transport = self.select(credential.as_ref());
        debug!(
            "Dispatching {} {} via {} transport",
            request.method,
            request.url,
            transport.kind()
        );
        transport.execute(request).await
    }

    /// List products matching a search filter.
    pub async fn search_products(&self, filter: &SearchFilter) -> AppResult<ApiResponse> {
        filter.validate()?;
        let options = RequestOptions::get().query(filter.to_query_pairs());
        self.request(Endpoint::Products, options).await
    }

    fn select(&self, credential: Option<&Credential>) -> &Arc<dyn TransportStrategy> {
        match self.mode {
            TransportMode::Simulated => &self.simulated,
            TransportMode::Real => &self.real,
            TransportMode::Auto => {
                if credential.is_some_and(Credential::is_demo) {
                    &self.simulated
                } else {
                    &self.real
                }
            }
        }
    }
}
