//! Forced reset handler registered on the gateway.

use std::sync::{Arc, Weak};

use gateway_lib::ResetHandler;
use tracing::debug;

use crate::context::SessionCore;

/// Drops the in-memory identity and re-runs restore when a credential
/// refresh fails.
///
/// Holds the session weakly; the gateway's hook must not keep it alive.
pub struct SessionResetter {
    core: Weak<SessionCore>,
}

impl SessionResetter {
    pub(crate) fn new(core: &Arc<SessionCore>) -> Self {
        Self {
            core: Arc::downgrade(core),
        }
    }
}

impl ResetHandler for SessionResetter {
    fn reset(&self) {
        match self.core.upgrade() {
            Some(core) => core.force_reset(),
            None => debug!("Reset requested after the session was dropped"),
        }
    }
}
