//! Shared helpers for integration tests across the workspace.

use anyhow::Context as _;
use async_trait::async_trait;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use bugcrowd_api::{ApiError, OutboundRequest, RawResponse, Transport};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::process::Child;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::task::JoinHandle;

/// Kills and reaps a spawned server when the test ends, pass or fail.
pub struct KillOnDrop(pub Child);

impl Drop for KillOnDrop {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

/// In-process [`Transport`] that records every request and replays scripted responses.
///
/// Unscripted calls answer `200 {}`.
#[derive(Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<Result<RawResponse, ApiError>>>,
    sent: Mutex<Vec<OutboundRequest>>,
    calls: AtomicUsize,
}

impl RecordingTransport {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond_json(&self, status: u16, body: &Value) {
        self.respond_raw(status, Some("application/json"), body.to_string().as_bytes());
    }

    pub fn respond_raw(&self, status: u16, content_type: Option<&str>, body: &[u8]) {
        self.responses.lock().push_back(Ok(RawResponse {
            status,
            content_type: content_type.map(str::to_string),
            body: body.to_vec(),
        }));
    }

    pub fn fail_with(&self, err: ApiError) {
        self.responses.lock().push_back(Err(err));
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn sent(&self) -> Vec<OutboundRequest> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().push(request);
        self.responses.lock().pop_front().unwrap_or_else(|| {
            Ok(RawResponse {
                status: 200,
                content_type: Some("application/json".to_string()),
                body: b"{}".to_vec(),
            })
        })
    }
}

/// One request as seen by [`MockApi`].
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    /// Lowercased header names.
    pub headers: HashMap<String, String>,
    pub body: String,
}

#[derive(Clone)]
struct CannedResponse {
    status: u16,
    content_type: &'static str,
    body: String,
}

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<(String, String), CannedResponse>>,
    received: Mutex<Vec<ReceivedRequest>>,
}

/// Local HTTP stand-in for the remote API.
///
/// Routes registered with `respond_*` answer with the canned response; everything else
/// echoes the request back as JSON.
pub struct MockApi {
    pub base_url: String,
    state: Arc<MockState>,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl MockApi {
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/{*path}", any(handle))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind mock API")?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        let handle = tokio::spawn(async move { server.await });

        Ok(Self {
            base_url: format!("http://{addr}"),
            state,
            shutdown_tx,
            handle,
        })
    }

    pub fn respond_json(&self, method: &str, path: &str, status: u16, body: &Value) {
        self.respond(method, path, status, "application/json", body.to_string());
    }

    pub fn respond_text(&self, method: &str, path: &str, status: u16, body: &str) {
        self.respond(method, path, status, "text/plain", body.to_string());
    }

    fn respond(
        &self,
        method: &str,
        path: &str,
        status: u16,
        content_type: &'static str,
        body: String,
    ) {
        self.state.routes.lock().insert(
            (method.to_ascii_uppercase(), path.to_string()),
            CannedResponse {
                status,
                content_type,
                body,
            },
        );
    }

    #[must_use]
    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.state.received.lock().clone()
    }

    /// # Errors
    ///
    /// Returns an error if the server task failed.
    pub async fn stop(self) -> anyhow::Result<()> {
        let _ = self.shutdown_tx.send(());
        self.handle
            .await
            .context("mock API task join")?
            .context("mock API server")?;
        Ok(())
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let received = ReceivedRequest {
        method: method.as_str().to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers: headers
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect(),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    state.received.lock().push(received.clone());

    let canned = state
        .routes
        .lock()
        .get(&(received.method.clone(), received.path.clone()))
        .cloned();

    match canned {
        Some(c) => (
            StatusCode::from_u16(c.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            [(header::CONTENT_TYPE, c.content_type)],
            c.body,
        )
            .into_response(),
        None => axum::Json(json!({
            "method": received.method,
            "path": received.path,
            "query": received.query,
            "body": received.body,
        }))
        .into_response(),
    }
}
