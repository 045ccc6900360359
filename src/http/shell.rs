//! Static landing page.
//!
//! The page is a thin presentational shell: it builds a relay URL in the
//! browser and submits it as an ordinary request. All proxying semantics
//! live server-side; this module only delivers the markup.

use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Serve the landing page at `/`.
pub async fn serve_index() -> Response {
    (
        [(
            CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        )],
        INDEX_HTML,
    )
        .into_response()
}
