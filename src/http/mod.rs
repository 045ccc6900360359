//! HTTP surface of the relay.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request dispatch)
//!     → exact "/"  → shell.rs (static landing page)
//!     → any other  → forwarding pipeline (crate::proxy)
//!     → error.rs (failures become plain-text 400/500 responses)
//! ```

pub mod error;
pub mod server;
pub mod shell;

pub use error::ProxyError;
pub use server::HttpServer;
