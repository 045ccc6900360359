//! Lifecycle management.
//!
//! The relay has no state to flush on exit; shutdown is just "stop
//! accepting, let in-flight requests finish".

pub mod shutdown;

pub use shutdown::Shutdown;
