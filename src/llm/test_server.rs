//! In-process upstream used by the client tests.
//!
//! Replies to `POST /v1/chat/completions` with a fixed status and body, and
//! records what it received.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{routing, Json, Router};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

pub struct TestUpstream {
    addr: SocketAddr,
    state: Arc<UpstreamState>,
    handle: tokio::task::JoinHandle<()>,
}

struct UpstreamState {
    status: StatusCode,
    body: Value,
    /// Sent verbatim instead of `body` when set.
    raw_body: Option<String>,
    delay: Duration,
    request_count: AtomicU32,
    last_payload: Mutex<Option<Value>>,
    last_headers: Mutex<HashMap<String, String>>,
}

impl TestUpstream {
    pub async fn start(status: u16, body: Value) -> Self {
        Self::start_inner(status, body, None, Duration::ZERO).await
    }

    pub async fn start_delayed(body: Value, delay: Duration) -> Self {
        Self::start_inner(200, body, None, delay).await
    }

    /// Reply with a plain-text body.
    pub async fn start_raw(status: u16, body: &str) -> Self {
        Self::start_inner(status, Value::Null, Some(body.to_string()), Duration::ZERO).await
    }

    async fn start_inner(
        status: u16,
        body: Value,
        raw_body: Option<String>,
        delay: Duration,
    ) -> Self {
        let state = Arc::new(UpstreamState {
            status: StatusCode::from_u16(status).unwrap(),
            body,
            raw_body,
            delay,
            request_count: AtomicU32::new(0),
            last_payload: Mutex::new(None),
            last_headers: Mutex::new(HashMap::new()),
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_chat))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::SeqCst)
    }

    pub fn last_payload(&self) -> Option<Value> {
        self.state.last_payload.lock().unwrap().clone()
    }

    pub fn last_header(&self, name: &str) -> Option<String> {
        self.state.last_headers.lock().unwrap().get(name).cloned()
    }
}

impl Drop for TestUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_chat(
    State(state): State<Arc<UpstreamState>>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    state.request_count.fetch_add(1, Ordering::SeqCst);
    *state.last_payload.lock().unwrap() = Some(payload);
    *state.last_headers.lock().unwrap() = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    match &state.raw_body {
        Some(raw) => (state.status, raw.clone()).into_response(),
        None => (state.status, Json(state.body.clone())).into_response(),
    }
}

/// An address nothing listens on.
pub async fn unused_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Answers one request with a 500 whose body ends before its declared length.
pub async fn truncated_error_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        socket
            .write_all(
                b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\nshort",
            )
            .await
            .unwrap();
        socket.shutdown().await.ok();
    });

    format!("http://{addr}")
}

/// Consume headers and a `content-length` body so the client sees no reset.
async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        let length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= end + 4 + length {
            return;
        }
    }
}
