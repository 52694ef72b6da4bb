//! Identity entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{DEFAULT_AVATAR_URL, DEMO_CONTACT_NUMBER, FALLBACK_DISPLAY_NAME};

/// Authenticated user record held by the session core.
///
/// Field names serialize in camelCase (`contactNumber`, `createdAt`). Only
/// this client reads the cached record back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Synthesize the identity produced by a demo login.
    ///
    /// The display name is the email local-part, or a fallback when the
    /// local-part is empty.
    pub fn for_login(email: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: display_name_from_email(email),
            email: email.to_string(),
            avatar: Some(DEFAULT_AVATAR_URL.to_string()),
            is_verified: true,
            is_admin: false,
            contact_number: Some(DEMO_CONTACT_NUMBER.to_string()),
            created_at: Utc::now(),
        }
    }

    /// Synthesize the identity produced by a demo registration.
    pub fn for_registration(name: &str, email: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            avatar: Some(DEFAULT_AVATAR_URL.to_string()),
            is_verified: false,
            is_admin: false,
            contact_number: None,
            created_at: Utc::now(),
        }
    }

    /// Merge a partial update into this identity.
    pub fn apply(&mut self, patch: IdentityPatch) {
        if let Some(id) = patch.id {
            self.id = id;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(avatar) = patch.avatar {
            self.avatar = non_empty(avatar);
        }
        if let Some(is_verified) = patch.is_verified {
            self.is_verified = is_verified;
        }
        if let Some(is_admin) = patch.is_admin {
            self.is_admin = is_admin;
        }
        if let Some(contact_number) = patch.contact_number {
            self.contact_number = non_empty(contact_number);
        }
        if let Some(created_at) = patch.created_at {
            self.created_at = created_at;
        }
    }

    /// Return a copy with the patch applied.
    pub fn merged(&self, patch: IdentityPatch) -> Self {
        let mut updated = self.clone();
        updated.apply(patch);
        updated
    }
}

/// Partial identity update. Absent fields keep their current value; an
/// empty avatar or contact number clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl IdentityPatch {
    /// True when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Derive a display name from the part of the email before `@`.
pub fn display_name_from_email(email: &str) -> String {
    match email.split('@').next() {
        Some(local) if !local.is_empty() => local.to_string(),
        _ => FALLBACK_DISPLAY_NAME.to_string(),
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
