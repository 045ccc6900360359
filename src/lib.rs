//! fetch-relay: a stateless, retrying HTTP(S) download relay.
//!
//! The target download URL travels inside the request path
//! (`/<percent-encoded absolute URL>`). The relay forwards the request to
//! that target with an allowlisted subset of the client's headers, retries
//! transient transport failures with exponential backoff, and streams the
//! response back with normalized headers (range support, filename
//! preservation, CORS).
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ http::server (router, error mapping)
//!                 │
//!                 ▼
//!              proxy::target (decode + validate the embedded URL)
//!                 │
//!                 ▼
//!              proxy::upstream (allowlisted headers, retrying fetch)
//!                 │                      │
//!                 │              resilience::backoff
//!                 ▼
//!              proxy::normalize (response allowlist, CORS,
//!                 │               Content-Disposition via proxy::filename)
//!                 ▼
//!   Client ◀── streamed body (no buffering, O(1) memory)
//! ```
//!
//! Nothing outlives a single request/response cycle: no cache, no
//! cross-request state, no coordination between in-flight requests.

// Core subsystems
pub mod config;
pub mod http;
pub mod proxy;

// Cross-cutting concerns
pub mod lifecycle;
pub mod resilience;

pub use config::ProxyConfig;
pub use http::{HttpServer, ProxyError};
pub use lifecycle::Shutdown;
