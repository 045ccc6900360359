//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream attempt fails (transport or timeout)
//!     → backoff.rs (delay for this retry)
//!     → proxy::upstream sleeps, then re-issues a fresh request
//! ```
//!
//! # Design Decisions
//! - Every attempt has a deadline; there are no unbounded waits
//! - Attempts are strictly sequential, never speculative
//! - HTTP error statuses are not retried; only transport failures are

pub mod backoff;
