//! Shared helpers for the dashboard integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use futures::StreamExt;
use http_body_util::BodyExt;
use medi_assistant::Assistant;
use medi_dashboard::{fallback, DashboardConfig, DashboardServer, DashboardState, Subscription};
use medi_store::Storage;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

pub type Viewer = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// A server over an in-memory store seeded with the demo data.
pub fn memory_server() -> DashboardServer {
    DashboardServer::new(
        DashboardConfig::default(),
        Storage::memory(fallback::snapshot().clone()),
        Assistant::Offline,
    )
}

/// A server with no storage at all.
pub fn offline_server() -> DashboardServer {
    DashboardServer::new(
        DashboardConfig::default(),
        Storage::Unavailable,
        Assistant::Offline,
    )
}

/// Send one request through the router and decode the JSON body.
pub async fn call(
    server: &DashboardServer,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = server.router().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn get(server: &DashboardServer, uri: &str) -> (StatusCode, Value) {
    call(server, Method::GET, uri, None).await
}

pub async fn post(server: &DashboardServer, uri: &str, body: Value) -> (StatusCode, Value) {
    call(server, Method::POST, uri, Some(body)).await
}

pub async fn patch(server: &DashboardServer, uri: &str, body: Value) -> (StatusCode, Value) {
    call(server, Method::PATCH, uri, Some(body)).await
}

/// Subscribe to live updates without a socket.
pub fn subscribe(server: &DashboardServer) -> Subscription {
    server.state().subscribers().try_subscribe().unwrap()
}

/// Decode the next queued update, if one was published.
pub fn next_update(subscription: &mut Subscription) -> Option<Value> {
    subscription
        .try_recv()
        .map(|frame| serde_json::from_str(&frame).unwrap())
}

/// A dashboard listening on an ephemeral localhost port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub server: DashboardServer,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    pub async fn start(config: DashboardConfig, storage: Storage) -> Self {
        let listener = DashboardServer::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        let server = DashboardServer::new(config, storage, Assistant::Offline);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let serving = server.clone();
        let handle = tokio::spawn(async move {
            serving
                .serve_listener(listener, async move {
                    let _ = shutdown_rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            server,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub async fn with_memory_store(config: DashboardConfig) -> Self {
        Self::start(config, Storage::memory(fallback::snapshot().clone())).await
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub fn state(&self) -> Arc<DashboardState> {
        self.server.state()
    }

    /// Open a viewer socket and wait until the server has registered it.
    pub async fn connect_viewer(&self) -> Viewer {
        let before = self.server.ws_connection_count();
        let (ws, _) = connect_async(self.ws_url()).await.unwrap();
        self.wait_for_connections(before + 1).await;
        ws
    }

    /// Poll until the server reports exactly `expected` viewers.
    pub async fn wait_for_connections(&self, expected: usize) {
        tokio::time::timeout(TEST_TIMEOUT, async {
            while self.server.ws_connection_count() != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| {
            panic!(
                "expected {expected} viewers, server reports {}",
                self.server.ws_connection_count()
            )
        });
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = tokio::time::timeout(TEST_TIMEOUT, handle).await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Read the next text frame from a viewer, skipping control frames.
pub async fn next_event(ws: &mut Viewer) -> Value {
    tokio::time::timeout(TEST_TIMEOUT, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => return serde_json::from_str(&text).unwrap(),
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                other => panic!("unexpected websocket frame: {other:?}"),
            }
        }
    })
    .await
    .expect("timed out waiting for a live update")
}
