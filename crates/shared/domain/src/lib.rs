//! Domain layer - Core session entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! The storage, gateway and session crates all speak in these types.

pub mod auth;
pub mod constants;
pub mod credential;
pub mod error;
pub mod identity;
pub mod search_filter;

pub use auth::{LoginRequest, PasswordChangeRequest, RegisterRequest};
pub use constants::*;
pub use credential::{bearer_value, Credential};
pub use error::{DomainError, DomainResult};
pub use identity::{display_name_from_email, Identity, IdentityPatch};
pub use search_filter::{Condition, ProductListing, SearchFilter, SearchFilterPatch, SortKey};
