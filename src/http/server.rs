//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router: landing page at `/`, forwarding pipeline
//!   everywhere else
//! - Wire up middleware (tracing, request IDs)
//! - Run the accept loop with graceful shutdown
//! - Drive the pipeline and map every failure to a plain-text response;
//!   an internal failure never propagates as a connection-level crash

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, Request};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::{ProxyConfig, UpstreamConfig};
use crate::http::error::ProxyError;
use crate::http::shell;
use crate::proxy::normalize;
use crate::proxy::target::extract_target;
use crate::proxy::upstream::{is_success_status, UpstreamFetcher, UpstreamRequest};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<UpstreamFetcher>,
    pub upstream: UpstreamConfig,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails only if the upstream client's TLS backend cannot
    /// initialize.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let fetcher = Arc::new(UpstreamFetcher::new(
            &config.upstream,
            config.retries.clone(),
        )?);
        let state = AppState {
            fetcher,
            upstream: config.upstream.clone(),
        };

        Ok(Self {
            router: Self::build_router(state),
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", any(shell::serve_index))
            .fallback(relay_handler)
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Forwarding pipeline entry point: every non-root path lands here.
async fn relay_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    match relay(&state, request).await {
        Ok(response) => response,
        Err(error) => {
            tracing::warn!(
                request_id = %request_id,
                status = %error.status(),
                error = %error,
                "Request failed"
            );
            error.into_response()
        }
    }
}

/// Run one request through the pipeline: extract target, fetch with
/// retries, normalize, stream.
async fn relay(state: &AppState, request: Request<Body>) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();

    // Path and query together: the target URL may carry its own query.
    let raw = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("");
    let raw = raw.strip_prefix('/').unwrap_or(raw);

    let target = extract_target(raw)?;

    tracing::debug!(method = %parts.method, target = %target.as_str(), "Relaying request");

    // CORS preflight never touches the origin.
    if parts.method == Method::OPTIONS {
        return normalize::preflight(&target);
    }

    // Buffer non-GET bodies once so every retry attempt can send its own
    // copy.
    let body = if parts.method == Method::GET || parts.method == Method::HEAD {
        None
    } else {
        let bytes = axum::body::to_bytes(body, state.upstream.max_body_bytes)
            .await
            .map_err(|e| ProxyError::Internal(format!("failed to buffer request body: {e}")))?;
        Some(bytes)
    };

    let upstream_request = UpstreamRequest::build(
        parts.method.clone(),
        target.url(),
        &parts.headers,
        body,
        &state.upstream.user_agent,
    )?;

    let response = state.fetcher.fetch(&upstream_request).await?;

    let status = response.status();
    if !is_success_status(status) {
        // Origin error statuses deliberately surface as an opaque relay
        // 500, not as a passthrough of the origin status.
        return Err(ProxyError::UpstreamError { status });
    }

    normalize::relay(&target, response)
}
