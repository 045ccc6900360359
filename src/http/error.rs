//! Error taxonomy for the forwarding pipeline.
//!
//! Validation failures map to 400 with the exact contract bodies; every
//! upstream or internal failure maps to 500 with a `Proxy error: ...`
//! body. No stack traces or internals beyond the constructed message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Everything that can go wrong while relaying one request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Request path carried no target URL.
    #[error("No URL provided")]
    MissingTarget,

    /// Percent-decoding the path did not produce a usable URL.
    #[error("Invalid URL encoding")]
    MalformedEncoding,

    /// Decoded target is not an absolute http(s) URL.
    #[error("Invalid URL: target must start with http:// or https://")]
    UnsupportedScheme,

    /// Every fetch attempt failed at the transport level.
    #[error("upstream unreachable after {attempts} attempts: {reason}")]
    UpstreamUnreachable { attempts: u32, reason: String },

    /// Upstream answered, but with a status outside 200-299/206.
    #[error("upstream responded with status {status}")]
    UpstreamError { status: StatusCode },

    /// Anything else (header construction, body buffering, ...).
    #[error("{0}")]
    Internal(String),
}

impl ProxyError {
    /// The HTTP status this error surfaces as.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingTarget | Self::MalformedEncoding | Self::UnsupportedScheme => {
                StatusCode::BAD_REQUEST
            }
            Self::UpstreamUnreachable { .. } | Self::UpstreamError { .. } | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = if status == StatusCode::BAD_REQUEST {
            self.to_string()
        } else {
            format!("Proxy error: {self}")
        };
        (status, body).into_response()
    }
}
