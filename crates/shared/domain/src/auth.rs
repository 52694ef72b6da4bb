//! Authentication request objects and their validation rules.

use serde::Serialize;
use validator::Validate;

use crate::constants::{LOGIN_FIELDS_REQUIRED, REGISTER_FIELDS_REQUIRED};
use crate::error::{DomainError, DomainResult};

/// Login input
#[derive(Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email and password are required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Email and password are required"))]
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Reject empty fields before any network or storage work.
    pub fn check(&self) -> DomainResult<()> {
        validate_with_fallback(self, &["email", "password"], LOGIN_FIELDS_REQUIRED)
    }
}

/// Registration input
#[derive(Clone, Serialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "All fields are required"))]
    pub name: String,
    #[validate(length(min = 1, message = "All fields are required"))]
    pub email: String,
    #[validate(length(min = 1, message = "All fields are required"))]
    pub password: String,
}

impl RegisterRequest {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn check(&self) -> DomainResult<()> {
        validate_with_fallback(self, &["name", "email", "password"], REGISTER_FIELDS_REQUIRED)
    }
}

/// Password change input
#[derive(Clone, Serialize, Validate)]
pub struct PasswordChangeRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub old_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
    #[validate(must_match(other = "new_password", message = "Passwords do not match"))]
    #[serde(rename = "new_password_confirm")]
    pub confirm_password: String,
}

impl PasswordChangeRequest {
    pub fn new(
        old_password: impl Into<String>,
        new_password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            old_password: old_password.into(),
            new_password: new_password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    pub fn check(&self) -> DomainResult<()> {
        validate_with_fallback(
            self,
            &["old_password", "new_password", "confirm_password"],
            "Invalid password change request",
        )
    }
}

/// Run validator rules and surface the message of the first failing field,
/// checked in `fields` order.
fn validate_with_fallback<T: Validate>(
    value: &T,
    fields: &[&str],
    fallback: &str,
) -> DomainResult<()> {
    value.validate().map_err(|e| {
        let errors = e.field_errors();
        let message = fields
            .iter()
            .filter_map(|field| errors.get(*field))
            .find_map(|errors| errors.first().and_then(|error| error.message.as_ref()))
            .map(|msg| msg.to_string())
            .unwrap_or_else(|| fallback.to_string());
        DomainError::validation(message)
    })
}
