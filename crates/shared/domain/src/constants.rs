//! Domain-level constants.
//!
//! These constants define the demo-mode business rules and the defaults
//! shared by the session core and the API gateway.

// =============================================================================
// Credentials
// =============================================================================

/// Prefix that marks an access token as a demo credential
pub const DEMO_TOKEN_PREFIX: &str = "demo_token_";

/// Authorization header prefix for Bearer tokens
pub const BEARER_TOKEN_PREFIX: &str = "Bearer ";

// =============================================================================
// Identity defaults
// =============================================================================

/// Avatar assigned to synthesized identities
pub const DEFAULT_AVATAR_URL: &str =
    "https://images.pexels.com/photos/1040880/pexels-photo-1040880.jpeg?auto=compress&cs=tinysrgb&w=100";

/// Display name used when the email local-part is empty
pub const FALLBACK_DISPLAY_NAME: &str = "User";

/// Contact number attached to identities synthesized by demo login
pub const DEMO_CONTACT_NUMBER: &str = "+1234567890";

// =============================================================================
// Validation
// =============================================================================

/// Message returned when login input is incomplete
pub const LOGIN_FIELDS_REQUIRED: &str = "Email and password are required";

/// Message returned when registration input is incomplete
pub const REGISTER_FIELDS_REQUIRED: &str = "All fields are required";

// =============================================================================
// Search filter defaults
// =============================================================================

/// Default lower price bound
pub const DEFAULT_MIN_PRICE: f64 = 0.0;

/// Default upper price bound
pub const DEFAULT_MAX_PRICE: f64 = 10_000.0;
