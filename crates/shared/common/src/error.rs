//! Unified error handling for the session client.
//!
//! One error type shared by the storage, gateway and session crates. The
//! taxonomy separates validation, authorization, connectivity and
//! server-reported application errors so callers can react to each.

use domain::DomainError;
use thiserror::Error;

/// Message shown when the remote API cannot be reached.
pub const CONNECTIVITY_MESSAGE: &str =
    "Unable to connect to server. This is a demo version - authentication works offline.";

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthorized,

    // Validation
    #[error("{0}")]
    Validation(String),

    // Server-reported failure (non-401 error status)
    #[error("Request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    // Network-level failure
    #[error("{0}")]
    ServiceUnavailable(String),

    // Local persistence
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    // Internal
    #[error("Internal error")]
    Internal(String),
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Api { .. } => "API_ERROR",
            AppError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            // Show full message for client errors
            AppError::Validation(msg) => msg.clone(),
            AppError::Api { message, .. } => message.clone(),
            AppError::ServiceUnavailable(msg) => msg.clone(),
            AppError::Config(msg) => msg.clone(),

            // Hide details for internal errors
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {}", msg);
                "Local storage is unavailable".to_string()
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {:?}", e);
                "Received malformed data".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            // Use default message for others
            _ => self.to_string(),
        }
    }

    /// HTTP status carried by a server-reported error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Api { status, .. } => Some(*status),
            AppError::Unauthorized => Some(401),
            _ => None,
        }
    }

    /// True for network-level failures.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, AppError::ServiceUnavailable(_))
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
            e @ DomainError::UnknownValue { .. } => AppError::Validation(e.to_string()),
            DomainError::Unauthorized => AppError::Unauthorized,
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        AppError::Api {
            status,
            message: message.into(),
        }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        AppError::Storage(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        AppError::Config(msg.into())
    }

    /// The single connectivity error surfaced for any network-level failure.
    pub fn unreachable() -> Self {
        AppError::ServiceUnavailable(CONNECTIVITY_MESSAGE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_validation_maps_to_validation() {
        let err: AppError = DomainError::validation("All fields are required").into();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.user_message(), "All fields are required");
    }

    #[test]
    fn test_unreachable_is_distinct_from_api_errors() {
        let offline = AppError::unreachable();
        assert!(offline.is_connectivity());
        assert_eq!(offline.user_message(), CONNECTIVITY_MESSAGE);

        let server = AppError::api(500, "boom");
        assert!(!server.is_connectivity());
        assert_eq!(server.status(), Some(500));
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::internal("lock poisoned at line 42");
        assert_eq!(err.user_message(), "An internal error occurred");
        assert_eq!(AppError::storage("disk full").user_message(), "Local storage is unavailable");
    }
}
