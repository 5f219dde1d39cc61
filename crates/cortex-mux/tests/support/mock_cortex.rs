#![allow(dead_code)]

//! In-process mock Cortex WebSocket server.
//!
//! Accepts plain `ws://` connections on an ephemeral localhost port and
//! hands each one to the test as a [`MockConnection`], which can read
//! the client's JSON-RPC requests, answer them, push unsolicited data
//! frames, and drop the socket to exercise reconnect behavior.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

pub const STEP_TIMEOUT: Duration = Duration::from_secs(3);

/// Cortex token the mock hands out from `authorize`.
pub const MOCK_TOKEN: &str = "mock-cortex-token";

/// Headset ID the mock reports from `queryHeadsets`.
pub const MOCK_HEADSET: &str = "EPOCX-1234";

/// Session ID the mock hands out from `createSession`.
pub const MOCK_SESSION: &str = "mock-session-1";

/// Numeric `id` of a captured JSON-RPC request.
pub fn rpc_id(request: &Value) -> u64 {
    request
        .get("id")
        .and_then(Value::as_u64)
        .expect("request missing numeric id")
}

enum ConnectionCommand {
    SendJson(Value),
    ForceClose,
}

/// One accepted WebSocket connection, driven from the test body.
pub struct MockConnection {
    index: usize,
    request_rx: mpsc::Receiver<Value>,
    command_tx: mpsc::Sender<ConnectionCommand>,
}

impl MockConnection {
    pub fn index(&self) -> usize {
        self.index
    }

    pub async fn recv_request(&mut self) -> Value {
        timeout(STEP_TIMEOUT, self.request_rx.recv())
            .await
            .expect("timed out waiting for request")
            .expect("mock connection request channel closed")
    }

    /// Receive the next request and assert its method.
    pub async fn recv_request_method(&mut self, expected_method: &str) -> Value {
        let request = self.recv_request().await;
        let method = request.get("method").and_then(Value::as_str);
        assert_eq!(method, Some(expected_method), "unexpected method request");
        request
    }

    pub async fn send_json(&self, value: Value) {
        self.command_tx
            .send(ConnectionCommand::SendJson(value))
            .await
            .expect("failed to send command to mock connection");
    }

    pub async fn send_result(&self, id: u64, result: Value) {
        self.send_json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": result,
        }))
        .await;
    }

    pub async fn send_error(&self, id: u64, code: i32, message: &str) {
        self.send_json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {
                "code": code,
                "message": message,
            }
        }))
        .await;
    }

    /// Push an unsolicited data frame (no `id`).
    pub async fn push_frame(&self, frame: Value) {
        self.send_json(frame).await;
    }

    /// Drop the TCP connection without a close handshake.
    pub async fn force_close(&self) {
        let _ = self.command_tx.send(ConnectionCommand::ForceClose).await;
    }

    /// Answer the link's session bootstrap script:
    /// `requestAccess` → `authorize` → `queryHeadsets` →
    /// `controlDevice` → `createSession`.
    pub async fn complete_session_bootstrap(&mut self) {
        let request = self.recv_request_method("requestAccess").await;
        self.send_result(rpc_id(&request), json!({ "accessGranted": true }))
            .await;

        let request = self.recv_request_method("authorize").await;
        self.send_result(rpc_id(&request), json!({ "cortexToken": MOCK_TOKEN }))
            .await;

        let request = self.recv_request_method("queryHeadsets").await;
        self.send_result(
            rpc_id(&request),
            json!([{ "id": MOCK_HEADSET, "status": "connected" }]),
        )
        .await;

        let request = self.recv_request_method("controlDevice").await;
        self.send_result(rpc_id(&request), json!({ "command": "connect" }))
            .await;

        let request = self.recv_request_method("createSession").await;
        self.send_result(
            rpc_id(&request),
            json!({ "id": MOCK_SESSION, "status": "active" }),
        )
        .await;
    }

    /// Answer a `subscribe` request for `stream` with a success entry.
    pub async fn accept_subscribe(&mut self, stream: &str) {
        let request = self.recv_request_method("subscribe").await;
        let streams = request
            .get("params")
            .and_then(|p| p.get("streams"))
            .and_then(Value::as_array)
            .expect("subscribe request missing streams");
        assert_eq!(streams, &vec![json!(stream)], "unexpected streams list");

        self.send_result(
            rpc_id(&request),
            json!({
                "success": [{ "streamName": stream }],
                "failure": [],
            }),
        )
        .await;
    }

    /// Answer a `subscribe` request for `stream` with a failure entry.
    pub async fn reject_subscribe(&mut self, stream: &str, message: &str) {
        let request = self.recv_request_method("subscribe").await;
        self.send_result(
            rpc_id(&request),
            json!({
                "success": [],
                "failure": [{ "streamName": stream, "code": -32016, "message": message }],
            }),
        )
        .await;
    }
}

/// The mock server itself; accepted connections come out of
/// [`accept_connection`](Self::accept_connection) in order.
pub struct MockCortexServer {
    addr: SocketAddr,
    connection_rx: mpsc::Receiver<MockConnection>,
    server_task: JoinHandle<()>,
}

impl MockCortexServer {
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        let addr = listener.local_addr()?;
        let (connection_tx, connection_rx) = mpsc::channel(16);
        let next_connection_index = Arc::new(AtomicUsize::new(0));

        let server_task = tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(pair) => pair,
                    Err(_) => break,
                };

                let connection_tx = connection_tx.clone();
                let connection_index = next_connection_index.fetch_add(1, Ordering::SeqCst);

                tokio::spawn(async move {
                    let ws_stream = match accept_async(stream).await {
                        Ok(ws) => ws,
                        Err(_) => return,
                    };

                    let (mut ws_sink, mut ws_source) = ws_stream.split();
                    let (request_tx, request_rx) = mpsc::channel(64);
                    let (command_tx, mut command_rx) = mpsc::channel(64);

                    let connection = MockConnection {
                        index: connection_index,
                        request_rx,
                        command_tx: command_tx.clone(),
                    };

                    if connection_tx.send(connection).await.is_err() {
                        return;
                    }

                    loop {
                        tokio::select! {
                            maybe_command = command_rx.recv() => {
                                match maybe_command {
                                    Some(ConnectionCommand::SendJson(value)) => {
                                        let message = Message::Text(value.to_string().into());
                                        if ws_sink.send(message).await.is_err() {
                                            break;
                                        }
                                    }
                                    Some(ConnectionCommand::ForceClose) => break,
                                    None => break,
                                }
                            }
                            maybe_message = ws_source.next() => {
                                match maybe_message {
                                    Some(Ok(Message::Text(text))) => {
                                        if let Ok(value) = serde_json::from_str::<Value>(&text) {
                                            let _ = request_tx.send(value).await;
                                        }
                                    }
                                    Some(Ok(Message::Close(_))) => break,
                                    Some(Ok(_)) => {}
                                    Some(Err(_)) => break,
                                    None => break,
                                }
                            }
                        }
                    }
                });
            }
        });

        Ok(Self {
            addr,
            connection_rx,
            server_task,
        })
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    pub async fn accept_connection(&mut self) -> MockConnection {
        timeout(STEP_TIMEOUT, self.connection_rx.recv())
            .await
            .expect("timed out waiting for client connection")
            .expect("mock server connection channel closed")
    }

    /// Accept a connection if one arrives within `wait`.
    pub async fn try_accept_connection(&mut self, wait: Duration) -> Option<MockConnection> {
        match timeout(wait, self.connection_rx.recv()).await {
            Ok(Some(connection)) => Some(connection),
            _ => None,
        }
    }
}

impl Drop for MockCortexServer {
    fn drop(&mut self) {
        self.server_task.abort();
    }
}
