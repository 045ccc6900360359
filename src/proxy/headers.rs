//! Shared header allowlists for each direction of the relay.
//!
//! One ordered list per direction, iterated once. Matching is
//! case-insensitive (`HeaderMap` keys are normalized). Anything not on a
//! list is dropped: no cookies, no authorization, no hop-by-hop headers
//! leak through in either direction.

use axum::http::header::{self, HeaderMap, HeaderName};

/// Client headers forwarded to the origin.
pub const REQUEST_ALLOWLIST: &[HeaderName] = &[
    header::RANGE,
    header::USER_AGENT,
    header::ACCEPT,
    header::ACCEPT_ENCODING,
    header::CACHE_CONTROL,
    header::IF_MODIFIED_SINCE,
    header::IF_NONE_MATCH,
];

/// Origin headers forwarded back to the client.
pub const RESPONSE_ALLOWLIST: &[HeaderName] = &[
    header::CONTENT_TYPE,
    header::CONTENT_LENGTH,
    header::CONTENT_RANGE,
    header::ACCEPT_RANGES,
    header::LAST_MODIFIED,
    header::ETAG,
    header::CACHE_CONTROL,
    header::EXPIRES,
];

/// Copy allowlisted, non-empty headers out of `source`, keeping every
/// value of a repeated header.
pub fn filter_headers(source: &HeaderMap, allowlist: &[HeaderName]) -> HeaderMap {
    let mut filtered = HeaderMap::new();
    for name in allowlist {
        for value in source.get_all(name) {
            if !value.is_empty() {
                filtered.append(name.clone(), value.clone());
            }
        }
    }
    filtered
}
