//! Shared utilities for integration testing: programmable mock origins
//! and a relay-under-test harness.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use fetch_relay::config::ProxyConfig;
use fetch_relay::http::HttpServer;
use fetch_relay::lifecycle::Shutdown;

/// What the mock origin does with one connection.
#[allow(dead_code)]
pub enum MockAction {
    /// Write this raw HTTP/1.1 response, then close.
    Respond(String),
    /// Close the socket without writing anything (transport failure).
    Hangup,
    /// Hold the socket open without ever responding (forces the relay's
    /// attempt timeout).
    Stall,
    /// Write this much of a response, then hold the socket open without
    /// finishing it (forces the relay's read timeout mid-body).
    RespondThenStall(String),
}

/// A mock origin server plus a counter of connections it handled.
pub struct MockOrigin {
    pub addr: SocketAddr,
    pub hits: Arc<AtomicU32>,
}

impl MockOrigin {
    pub fn hit_count(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Start a mock origin. The responder sees the zero-based hit number and
/// the raw request text, and decides what to do with the connection.
pub async fn start_mock_origin<F>(responder: F) -> MockOrigin
where
    F: Fn(u32, &str) -> MockAction + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicU32::new(0));

    let task_hits = hits.clone();
    let responder = Arc::new(responder);
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let hits = task_hits.clone();
            let responder = responder.clone();
            tokio::spawn(async move {
                let mut data = Vec::new();
                let mut buf = [0u8; 4096];
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => data.extend_from_slice(&buf[..n]),
                    }
                    if request_complete(&data) {
                        break;
                    }
                }
                let request = String::from_utf8_lossy(&data).into_owned();
                let hit = hits.fetch_add(1, Ordering::SeqCst);
                match responder(hit, &request) {
                    MockAction::Respond(response) => {
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    }
                    MockAction::Hangup => drop(socket),
                    MockAction::Stall => {
                        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
                        drop(socket);
                    }
                    MockAction::RespondThenStall(partial) => {
                        let _ = socket.write_all(partial.as_bytes()).await;
                        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
                        drop(socket);
                    }
                }
            });
        }
    });

    MockOrigin { addr, hits }
}

/// True once `data` holds the full head and, if Content-Length says so,
/// the full body.
fn request_complete(data: &[u8]) -> bool {
    let text = String::from_utf8_lossy(data);
    let Some(head_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..head_end]
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())?
        })
        .unwrap_or(0);
    data.len() >= head_end + 4 + content_length
}

/// A plain 200 response. `extra_headers` must be full `Name: value\r\n`
/// lines or empty.
#[allow(dead_code)]
pub fn ok_response(extra_headers: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n{}",
        body.len(),
        extra_headers,
        body
    )
}

#[allow(dead_code)]
pub fn status_response(status_line: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    )
}

/// A running relay bound to an ephemeral port. Shuts down on drop.
pub struct RelayHandle {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl RelayHandle {
    /// Relay URL for the given (unencoded) target.
    pub fn url_for(&self, target: &str) -> String {
        format!("http://{}/{}", self.addr, target)
    }
}

impl Drop for RelayHandle {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the relay with the given config on an ephemeral port.
pub async fn start_relay(config: ProxyConfig) -> RelayHandle {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config).expect("server init");

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    RelayHandle { addr, shutdown }
}

/// Config with fast backoff so retry tests stay quick.
pub fn test_config() -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.retries.base_delay_ms = 20;
    config.retries.max_delay_ms = 200;
    config.upstream.attempt_timeout_secs = 5;
    config
}

/// Non-pooling client so each test request opens a fresh connection.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
