//! Credential value object - bearer access token plus optional refresh token.

use chrono::Utc;

use crate::constants::{BEARER_TOKEN_PREFIX, DEMO_TOKEN_PREFIX};

/// Opaque bearer/refresh token pair controlling authorization.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access: String,
    refresh: Option<String>,
}

// Don't expose tokens in debug output (security)
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access", &"[REDACTED]")
            .field("refresh", &self.refresh.as_ref().map(|_| "[REDACTED]"))
            .field("demo", &self.is_demo())
            .finish()
    }
}

impl Credential {
    /// Wrap an access token issued by the server.
    pub fn new(access: impl Into<String>, refresh: Option<String>) -> Self {
        Self {
            access: access.into(),
            refresh,
        }
    }

    /// Synthesize a demo credential. Demo credentials never carry a refresh token.
    pub fn demo() -> Self {
        Self {
            access: format!("{}{}", DEMO_TOKEN_PREFIX, Utc::now().timestamp_millis()),
            refresh: None,
        }
    }

    /// True when this credential was synthesized locally and must never reach the network.
    pub fn is_demo(&self) -> bool {
        self.access.starts_with(DEMO_TOKEN_PREFIX)
    }

    pub fn access_token(&self) -> &str {
        &self.access
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh.as_deref()
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        bearer_value(&self.access)
    }

    /// Replace the access token, keeping the refresh token.
    pub fn with_access(self, access: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: self.refresh,
        }
    }
}

/// Format an access token as an `Authorization` header value.
pub fn bearer_value(access: &str) -> String {
    format!("{}{}", BEARER_TOKEN_PREFIX, access)
}
