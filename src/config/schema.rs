//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML and carry
//! defaults matching the documented relay behavior (30 s attempt timeout,
//! 3 retries, 1 s base backoff).

use serde::{Deserialize, Serialize};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream fetch settings.
    pub upstream: UpstreamConfig,

    /// Retry configuration.
    pub retries: RetryConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream fetch settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// User-Agent presented to origin servers. Always overrides the
    /// client's own User-Agent.
    pub user_agent: String,

    /// Deadline for obtaining the response head, per attempt. Does not
    /// bound body streaming time.
    pub attempt_timeout_secs: u64,

    /// Cap on buffered non-GET request bodies. Bodies are buffered once
    /// so every retry attempt can send an independent copy.
    pub max_body_bytes: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("FetchRelay/", env!("CARGO_PKG_VERSION")).to_string(),
            attempt_timeout_secs: 30,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Retry configuration for transport-level upstream failures.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the initial attempt (so max_retries + 1 attempts
    /// total).
    pub max_retries: u32,

    /// First backoff delay; doubles on each further retry.
    pub base_delay_ms: u64,

    /// Upper bound on a single backoff delay.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
        }
    }
}
