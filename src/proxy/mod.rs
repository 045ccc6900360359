//! The forwarding pipeline.
//!
//! # Data Flow
//! ```text
//! inbound path-and-query
//!     → target.rs (percent-decode, scheme check → TargetDescriptor)
//!     → upstream.rs (allowlisted request headers, retrying fetch)
//!     → normalize.rs (allowlisted response headers, range/CORS shim,
//!        Content-Disposition via filename.rs, streamed body relay)
//! ```
//!
//! # Design Decisions
//! - One shared ordered allowlist per direction (headers.rs), iterated
//!   once, so request- and response-side filtering cannot drift apart
//! - Every retry attempt sends an independent copy of the request;
//!   consumed body streams are never reused
//! - The body is relayed as a stream, never buffered

pub mod filename;
pub mod headers;
pub mod normalize;
pub mod target;
pub mod upstream;
