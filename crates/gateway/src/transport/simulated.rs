//! Offline transport for demo sessions.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use common::AppResult;

use super::{TransportKind, TransportStrategy};
use crate::request::{ApiResponse, RequestDescriptor};

/// Answers every request with a canned success after a fixed delay.
pub struct SimulatedTransport {
    latency: Duration,
}

impl SimulatedTransport {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

#[async_trait]
impl TransportStrategy for SimulatedTransport {
    async fn execute(&self, request: RequestDescriptor) -> AppResult<ApiResponse> {
        debug!(
            "Simulating {} {} ({}ms)",
            request.method,
            request.url,
            self.latency.as_millis()
        );
        tokio::time::sleep(self.latency).await;
        Ok(ApiResponse::simulated_success())
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Simulated
    }
}
