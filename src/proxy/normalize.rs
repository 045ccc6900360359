//! Response normalization and the body relay.
//!
//! Filters the origin's headers down to a safe allowlist, injects the
//! range/CORS compatibility headers and the relay's own
//! `Content-Disposition`, and streams the body through byte-exact: no
//! decompression, no transformation, no re-buffering.

use axum::body::Body;
use axum::http::header::{
    ACCEPT_RANGES, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, CONTENT_DISPOSITION,
};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use futures_util::TryStreamExt;

use crate::http::error::ProxyError;
use crate::proxy::filename::{content_disposition, resolve_filename};
use crate::proxy::headers::{filter_headers, RESPONSE_ALLOWLIST};
use crate::proxy::target::TargetDescriptor;

/// CORS preflight answer: computed headers, empty body, and no upstream
/// contact at all.
pub fn preflight(target: &TargetDescriptor) -> Result<Response, ProxyError> {
    let mut headers = always_set_headers(target)?;
    headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    Ok(assemble(StatusCode::OK, headers, Body::empty()))
}

/// Relay the upstream response: normalized headers, streamed body,
/// upstream status preserved.
pub fn relay(target: &TargetDescriptor, upstream: reqwest::Response) -> Result<Response, ProxyError> {
    let status = upstream.status();

    let mut headers = filter_headers(upstream.headers(), RESPONSE_ALLOWLIST);

    // Optimistic range-support shim: most origins honor ranges even when
    // they omit the header. If one truly does not, its own range
    // rejection flows back to the client on the next request.
    if !headers.contains_key(ACCEPT_RANGES) {
        headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    }

    headers.extend(always_set_headers(target)?);

    let stream = upstream.bytes_stream().map_err(std::io::Error::other);
    Ok(assemble(status, headers, Body::from_stream(stream)))
}

/// Headers present on every relayed response, preflight included.
fn always_set_headers(target: &TargetDescriptor) -> Result<HeaderMap, ProxyError> {
    let filename = resolve_filename(target.url());

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_DISPOSITION, content_disposition(&filename)?);
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, HEAD, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Range, Content-Type"),
    );
    headers.insert(
        ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("Content-Length, Content-Range, Accept-Ranges, Content-Disposition"),
    );
    Ok(headers)
}

fn assemble(status: StatusCode, headers: HeaderMap, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
