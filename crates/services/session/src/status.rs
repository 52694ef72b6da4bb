//! Session lifecycle states.

use serde::Serialize;

/// `Initializing -> {Authenticated, Unauthenticated}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Initializing,
    Authenticated,
    Unauthenticated,
}

impl SessionStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionStatus::Authenticated)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Initializing => write!(f, "initializing"),
            SessionStatus::Authenticated => write!(f, "authenticated"),
            SessionStatus::Unauthenticated => write!(f, "unauthenticated"),
        }
    }
}
