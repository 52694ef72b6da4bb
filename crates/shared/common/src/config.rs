//! Client configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Default API base URL when `MARKET_API_URL` is unset
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Default namespace prefix for persisted keys
pub const DEFAULT_STORAGE_NAMESPACE: &str = "evolutionMarket";

/// Default location of the durable store
pub const DEFAULT_STORAGE_PATH: &str = ".market/storage.json";

/// Which transport the gateway dispatches through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Simulated when the stored credential is a demo credential, real otherwise
    #[default]
    Auto,
    /// Never touch the network
    Simulated,
    /// Always dispatch over HTTP
    Real,
}

impl FromStr for TransportMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(TransportMode::Auto),
            "simulated" | "demo" => Ok(TransportMode::Simulated),
            "real" | "http" => Ok(TransportMode::Real),
            other => Err(AppError::config(format!("unknown transport mode '{}'", other))),
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportMode::Auto => write!(f, "auto"),
            TransportMode::Simulated => write!(f, "simulated"),
            TransportMode::Real => write!(f, "real"),
        }
    }
}

/// Session client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the remote API
    pub api_base_url: String,
    /// Transport selection
    pub transport: TransportMode,
    /// Delay before a simulated response, in milliseconds
    pub simulated_latency_ms: u64,
    /// Simulated login latency, in milliseconds
    pub login_latency_ms: u64,
    /// Simulated registration latency, in milliseconds
    pub register_latency_ms: u64,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
    /// Path of the durable JSON store
    pub storage_path: PathBuf,
    /// Key namespace inside the store
    pub storage_namespace: String,
    /// Ask the server for the profile when restoring a cached session
    pub revalidate_on_restore: bool,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Unset or unparseable values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let transport = match lookup("MARKET_TRANSPORT") {
            Some(raw) => raw.parse().unwrap_or_else(|e: AppError| {
                tracing::warn!("{}, falling back to {}", e.user_message(), defaults.transport);
                defaults.transport
            }),
            None => defaults.transport,
        };

        Self {
            api_base_url: lookup("MARKET_API_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.api_base_url),
            transport,
            simulated_latency_ms: lookup("MARKET_SIMULATED_LATENCY_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.simulated_latency_ms),
            login_latency_ms: lookup("MARKET_LOGIN_LATENCY_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.login_latency_ms),
            register_latency_ms: lookup("MARKET_REGISTER_LATENCY_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.register_latency_ms),
            request_timeout_secs: lookup("MARKET_REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
            storage_path: lookup("MARKET_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
            storage_namespace: lookup("MARKET_STORAGE_NAMESPACE")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.storage_namespace),
            revalidate_on_restore: lookup("MARKET_REVALIDATE_ON_RESTORE")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.revalidate_on_restore),
        }
    }

    /// Configuration with every simulated delay set to zero.
    pub fn without_latency(mut self) -> Self {
        self.simulated_latency_ms = 0;
        self.login_latency_ms = 0;
        self.register_latency_ms = 0;
        self
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }

    pub fn login_latency(&self) -> Duration {
        Duration::from_millis(self.login_latency_ms)
    }

    pub fn register_latency(&self) -> Duration {
        Duration::from_millis(self.register_latency_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            transport: TransportMode::Auto,
            simulated_latency_ms: 500,
            login_latency_ms: 1000,
            register_latency_ms: 1500,
            request_timeout_secs: 30,
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            storage_namespace: DEFAULT_STORAGE_NAMESPACE.to_string(),
            revalidate_on_restore: false,
        }
    }
}
