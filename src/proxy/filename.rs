//! Download filename resolution for `Content-Disposition`.
//!
//! Resolution never fails: when neither the path nor the query yields a
//! name with an extension, a deterministic `download_<host>_<millis>`
//! fallback is generated.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::HeaderValue;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::http::error::ProxyError;

/// Characters that survive unescaped in the RFC 5987 `filename*` value
/// (attr-char).
const RFC5987_ATTR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Characters replaced with `_` so the name stays filesystem-safe.
const UNSAFE_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Query parameters that may carry a filename, highest priority first.
const FILENAME_PARAMS: &[&str] = &["filename", "file", "name", "download"];

/// Resolve the download filename for a target URL.
pub fn resolve_filename(url: &Url) -> String {
    resolve_filename_at(url, unix_millis())
}

/// Resolution with an injected clock, so tests are deterministic.
///
/// First match wins: last path segment with an extension-like `.`, then
/// a filename-ish query parameter whose value has one, then the
/// generated fallback.
pub fn resolve_filename_at(url: &Url, now_millis: u128) -> String {
    let mut candidate = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
        .map(str::to_owned);

    if candidate.as_deref().is_none_or(|c| !c.contains('.')) {
        candidate = query_candidate(url);
    }

    match candidate {
        Some(name) if name.contains('.') => sanitize(&name),
        _ => fallback_name(url, now_millis),
    }
}

/// Build the `Content-Disposition` header, carrying both the legacy
/// quoted form and the RFC 5987 extended form.
pub fn content_disposition(filename: &str) -> Result<HeaderValue, ProxyError> {
    let legacy: String = filename
        .chars()
        .map(|c| if c == '"' || c == '\\' { '_' } else { c })
        .collect();
    let encoded = utf8_percent_encode(filename, RFC5987_ATTR);
    let value = format!("attachment; filename=\"{legacy}\"; filename*=UTF-8''{encoded}");

    HeaderValue::from_bytes(value.as_bytes())
        .map_err(|_| ProxyError::Internal("failed to build Content-Disposition".into()))
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Scan the raw (still percent-encoded) query for a filename-bearing
/// parameter. Raw values keep the single decode step of `sanitize`
/// uniform across path and query candidates.
fn query_candidate(url: &Url) -> Option<String> {
    let query = url.query()?;
    FILENAME_PARAMS.iter().find_map(|param| {
        query.split('&').find_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            (name == *param && value.contains('.')).then(|| value.to_owned())
        })
    })
}

fn sanitize(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| if UNSAFE_CHARS.contains(&c) { '_' } else { c })
        .collect();

    // Names are often percent-encoded inside the URL itself; decode once
    // to recover the human-readable form.
    match percent_decode_str(&replaced).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => replaced,
    }
}

fn fallback_name(url: &Url, now_millis: u128) -> String {
    match url.host_str() {
        Some(host) => {
            let host: String = host
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                        c
                    } else {
                        '_'
                    }
                })
                .collect();
            format!("download_{host}_{now_millis}")
        }
        None => format!("download_{now_millis}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn takes_last_path_segment_with_extension() {
        assert_eq!(
            resolve_filename_at(&url("https://a.com/path/report.pdf"), 0),
            "report.pdf"
        );
        // Trailing slash: empty segments are discarded.
        assert_eq!(
            resolve_filename_at(&url("https://a.com/path/report.pdf/"), 0),
            "report.pdf"
        );
    }

    #[test]
    fn falls_back_to_query_parameters_in_priority_order() {
        assert_eq!(
            resolve_filename_at(&url("https://a.com/download?filename=movie.mp4"), 0),
            "movie.mp4"
        );
        // "filename" beats "file" regardless of query order.
        assert_eq!(
            resolve_filename_at(&url("https://a.com/get?file=b.bin&filename=a.bin"), 0),
            "a.bin"
        );
        // Extensionless values are skipped.
        assert_eq!(
            resolve_filename_at(&url("https://a.com/get?filename=noext&name=real.zip"), 0),
            "real.zip"
        );
    }

    #[test]
    fn generates_deterministic_fallback() {
        assert_eq!(
            resolve_filename_at(&url("https://a.com/"), 1234),
            "download_a.com_1234"
        );
        assert_eq!(
            resolve_filename_at(&url("https://a.com/latest"), 99),
            "download_a.com_99"
        );
    }

    #[test]
    fn decodes_percent_encoded_names() {
        assert_eq!(
            resolve_filename_at(&url("https://a.com/My%20Report%202024.pdf"), 0),
            "My Report 2024.pdf"
        );
    }

    #[test]
    fn replaces_filesystem_unsafe_characters() {
        assert_eq!(
            resolve_filename_at(&url("https://a.com/get?filename=a:b*c.txt"), 0),
            "a_b_c.txt"
        );
    }

    #[test]
    fn content_disposition_carries_both_forms() {
        let value = content_disposition("My Report.pdf").unwrap();
        assert_eq!(
            value.to_str().unwrap(),
            "attachment; filename=\"My Report.pdf\"; filename*=UTF-8''My%20Report.pdf"
        );
    }
}
