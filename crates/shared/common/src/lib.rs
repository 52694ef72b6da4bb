//! Common utilities shared across the session client crates.
//!
//! This crate provides:
//! - Unified error handling
//! - Client configuration

pub mod config;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult, CONNECTIVITY_MESSAGE};
