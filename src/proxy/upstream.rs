//! Upstream fetch engine with bounded retries.
//!
//! Each attempt sends an independent copy of the request: the inbound
//! body is buffered once by the caller and headers are cloned per
//! attempt, because a consumed body stream cannot be replayed.
//!
//! Only transport-level failures (connect errors, resets, attempt
//! timeouts) are retried. An HTTP response of any status counts as a
//! successful attempt and is returned to the caller untouched.

use std::time::Duration;

use axum::body::Bytes;
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use thiserror::Error;
use url::Url;

use crate::config::{RetryConfig, UpstreamConfig};
use crate::http::error::ProxyError;
use crate::proxy::headers::{filter_headers, REQUEST_ALLOWLIST};
use crate::resilience::backoff::calculate_backoff;

/// Template for one upstream fetch. Cheap to re-issue per attempt.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl UpstreamRequest {
    /// Build the per-request template from the inbound request.
    ///
    /// Copies the allowlisted client headers, then unconditionally
    /// overwrites User-Agent with the relay's identifying string.
    pub fn build(
        method: Method,
        url: &Url,
        inbound_headers: &HeaderMap,
        body: Option<Bytes>,
        user_agent: &str,
    ) -> Result<Self, ProxyError> {
        let mut headers = filter_headers(inbound_headers, REQUEST_ALLOWLIST);
        let ua = HeaderValue::from_str(user_agent).map_err(|_| {
            ProxyError::Internal("configured user agent is not a valid header value".into())
        })?;
        headers.insert(USER_AGENT, ua);

        // GET and HEAD carry no body.
        let body = if method == Method::GET || method == Method::HEAD {
            None
        } else {
            body
        };

        Ok(Self {
            method,
            url: url.clone(),
            headers,
            body,
        })
    }
}

/// Statuses the caller treats as a successful fetch (200-299, and 206
/// partial content explicitly).
pub fn is_success_status(status: StatusCode) -> bool {
    status.is_success() || status == StatusCode::PARTIAL_CONTENT
}

/// One upstream attempt's failure, before retry policy is applied.
///
/// Timeouts and network failures flow through the same retry path; the
/// distinction only survives in the error message.
#[derive(Debug, Error)]
enum FetchFailure {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),
}

/// Retrying fetch engine. Shared across requests; holds no per-request
/// state.
pub struct UpstreamFetcher {
    client: reqwest::Client,
    attempt_timeout: Duration,
    retries: RetryConfig,
}

impl UpstreamFetcher {
    /// Build the fetcher and its HTTP client.
    ///
    /// Fails only if the TLS backend cannot initialize.
    pub fn new(upstream: &UpstreamConfig, retries: RetryConfig) -> Result<Self, reqwest::Error> {
        let attempt_timeout = Duration::from_secs(upstream.attempt_timeout_secs);
        // The relay is itself the proxy; never chain through env-configured
        // system proxies. The read timeout bounds per-read stalls during
        // body streaming without capping total transfer time.
        let client = reqwest::Client::builder()
            .no_proxy()
            .read_timeout(attempt_timeout)
            .build()?;
        Ok(Self {
            client,
            attempt_timeout,
            retries,
        })
    }

    /// Issue the request, retrying transport failures with exponential
    /// backoff, and return the first response obtained.
    pub async fn fetch(&self, request: &UpstreamRequest) -> Result<reqwest::Response, ProxyError> {
        let max_attempts = self.retries.max_retries.saturating_add(1);
        let mut attempt: u32 = 0;

        loop {
            match self.try_once(request).await {
                Ok(response) => {
                    if attempt > 0 {
                        tracing::info!(
                            url = %request.url,
                            attempt = attempt + 1,
                            "Upstream attempt succeeded after retries"
                        );
                    }
                    return Ok(response);
                }
                Err(failure) => {
                    attempt += 1;
                    if attempt < max_attempts {
                        let delay = calculate_backoff(
                            attempt,
                            self.retries.base_delay_ms,
                            self.retries.max_delay_ms,
                        );
                        tracing::warn!(
                            url = %request.url,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %failure,
                            "Upstream attempt failed, backing off"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    tracing::error!(
                        url = %request.url,
                        attempts = max_attempts,
                        error = %failure,
                        "Upstream unreachable"
                    );
                    return Err(ProxyError::UpstreamUnreachable {
                        attempts: max_attempts,
                        reason: failure.to_string(),
                    });
                }
            }
        }
    }

    /// One attempt: a fresh request value, with the timeout covering
    /// time-to-response-head only so long downloads are not cut off
    /// mid-body. Mid-body stalls are bounded by the client's read
    /// timeout instead.
    async fn try_once(&self, request: &UpstreamRequest) -> Result<reqwest::Response, FetchFailure> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        match tokio::time::timeout(self.attempt_timeout, builder.send()).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(error)) => Err(FetchFailure::Transport(error)),
            Err(_) => Err(FetchFailure::Timeout(self.attempt_timeout)),
        }
    }
}
