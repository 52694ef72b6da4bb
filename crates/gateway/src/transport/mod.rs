//! Transport strategies.
//!
//! The gateway never inspects credentials itself; it picks a
//! [`TransportStrategy`] and hands it a fully built request.

mod real;
mod simulated;

pub use real::RealTransport;
pub use simulated::SimulatedTransport;

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::warn;

use common::AppResult;

use crate::request::{ApiResponse, RequestDescriptor};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Which strategy handled a request (for logs and diagnostics).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Simulated,
    Real,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Simulated => write!(f, "simulated"),
            TransportKind::Real => write!(f, "real"),
        }
    }
}

/// Capability to dispatch a request.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait TransportStrategy: Send + Sync {
    async fn execute(&self, request: RequestDescriptor) -> AppResult<ApiResponse>;

    fn kind(&self) -> TransportKind;
}

/// Reaction to an unrecoverable authorization failure: the client-side
/// equivalent of reloading the whole application.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ResetHandler: Send + Sync {
    fn reset(&self);
}

/// Late-bound slot for the [`ResetHandler`].
///
/// The gateway is built before the session that owns the handler, so the
/// handler is registered after construction.
#[derive(Default)]
pub struct ResetHook {
    handler: RwLock<Option<Arc<dyn ResetHandler>>>,
}

impl ResetHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, handler: Arc<dyn ResetHandler>) {
        *self.handler.write() = Some(handler);
    }

    pub fn is_registered(&self) -> bool {
        self.handler.read().is_some()
    }

    /// Invoke the registered handler.
    pub fn trigger(&self) {
        // Clone out so the handler may re-register without deadlocking
        let handler = self.handler.read().clone();
        match handler {
            Some(handler) => handler.reset(),
            None => warn!("Session reset requested but no reset handler is registered"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_without_handler_is_harmless() {
        let hook = ResetHook::new();
        assert!(!hook.is_registered());
        hook.trigger();
    }

    #[test]
    fn test_trigger_calls_registered_handler_once() {
        let mut handler = MockResetHandler::new();
        handler.expect_reset().times(1).return_const(());

        let hook = ResetHook::new();
        hook.register(Arc::new(handler));
        hook.trigger();
    }
}
