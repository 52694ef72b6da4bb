//! Session Library
//!
//! The session context tracks who is signed in:
//! - restores a cached identity and credential from the persisted store
//! - performs demo login and registration without a network round-trip
//! - tears the session down on logout even when the server is unreachable
//! - recovers from a failed credential refresh through the gateway's reset hook

pub mod context;
pub mod reset;
pub mod status;

pub use context::SessionContext;
pub use reset::SessionResetter;
pub use status::SessionStatus;
