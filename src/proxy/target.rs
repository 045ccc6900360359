//! Target URL extraction and validation.
//!
//! The target is the inbound path-and-query with the leading `/`
//! stripped, percent-decoded. The query must ride along untouched
//! because the target URL may itself carry one. Only absolute http(s)
//! URLs are accepted; anything reachable over those schemes is fair
//! game. There is no DNS or SSRF filtering: the relay is deliberately an
//! open forwarder, which is a documented tradeoff rather than an
//! oversight.

use percent_encoding::percent_decode_str;
use url::Url;

use crate::http::error::ProxyError;

/// The decoded absolute URL one request forwards to.
///
/// Derived once per request and immutable afterwards.
#[derive(Debug, Clone)]
pub struct TargetDescriptor {
    url: Url,
}

impl TargetDescriptor {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

/// Parse the inbound path into a target.
///
/// `raw` is everything after the leading `/`, still percent-encoded.
pub fn extract_target(raw: &str) -> Result<TargetDescriptor, ProxyError> {
    if raw.is_empty() {
        return Err(ProxyError::MissingTarget);
    }

    // percent_decode_str passes malformed escapes through verbatim, so
    // the syntax has to be checked up front.
    if !valid_percent_escapes(raw) {
        return Err(ProxyError::MalformedEncoding);
    }

    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| ProxyError::MalformedEncoding)?;

    // Exact, case-sensitive prefix check.
    if !decoded.starts_with("http://") && !decoded.starts_with("https://") {
        return Err(ProxyError::UnsupportedScheme);
    }

    let url = Url::parse(&decoded).map_err(|_| ProxyError::MalformedEncoding)?;

    Ok(TargetDescriptor { url })
}

/// Every `%` must introduce a two-hex-digit escape.
fn valid_percent_escapes(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if i + 2 >= bytes.len()
                || !bytes[i + 1].is_ascii_hexdigit()
                || !bytes[i + 2].is_ascii_hexdigit()
            {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}
