//! HTTP backend used by the real transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error};

use common::{AppError, AppResult};

use crate::request::{ApiResponse, Method, RequestDescriptor};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Sends one HTTP request. Network-level failures surface as the single
/// connectivity error; every status code is returned as a response.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait HttpBackend: Send + Sync {
    async fn send(&self, request: &RequestDescriptor) -> AppResult<ApiResponse>;
}

/// `reqwest`-backed HTTP backend.
pub struct ReqwestBackend {
    client: Client,
}

impl ReqwestBackend {
    /// Build a backend with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the client cannot be constructed.
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn send(&self, request: &RequestDescriptor) -> AppResult<ApiResponse> {
        debug!("{} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(reqwest_method(request.method), request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(map_transport_error)?;

        debug!("{} {} -> {}", request.method, request.url, status);
        Ok(ApiResponse::from_bytes(status, &bytes))
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn map_transport_error(e: reqwest::Error) -> AppError {
    error!("API request error: {}", e);
    AppError::unreachable()
}
