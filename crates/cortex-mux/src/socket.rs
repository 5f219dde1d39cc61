//! # Cortex WebSocket JSON-RPC transport
//!
//! One WebSocket connection, split into reader and writer halves with
//! `tokio-tungstenite`'s `StreamExt::split()`, so that RPC calls and
//! data frames share the wire concurrently:
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                 CortexSocket                      │
//! │                                                   │
//! │  writer: Arc<Mutex<SplitSink>>  ◄── call()        │
//! │                                                   │
//! │  reader loop (spawned task):                      │
//! │    SplitStream ─┬─► response by id → oneshot tx   │
//! │                 └─► data frame by kind → mpsc tx  │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! `call()` does not time out: a response that never arrives stalls
//! only the workflow that asked for it, and every pending call is
//! drained with `ConnectionLost` when the socket closes.
//!
//! ## TLS Note
//!
//! The Cortex service runs at `wss://localhost:6868` with a self-signed
//! TLS certificate. `native-tls` is configured to accept it for
//! localhost connections only.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use native_tls::TlsConnector as NativeTlsConnector;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async_tls_with_config,
    tungstenite::{http, Message},
    Connector, MaybeTlsStream, WebSocketStream,
};

use crate::config::MuxConfig;
use crate::error::{MuxError, MuxResult};
use crate::protocol::{frame_kind, RpcRequest, RpcResponse};

/// Connection timeout for the initial WebSocket handshake.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Channel buffer size for data frame channels.
pub(crate) const FRAME_CHANNEL_BUFFER: usize = 1024;

/// Type alias for the write half of the WebSocket connection.
type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Type alias for the read half of the WebSocket connection.
type WsReader = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// A pending RPC call awaiting its matching response by `id`.
type PendingResponse = oneshot::Sender<MuxResult<serde_json::Value>>;

/// Senders for dispatching data frames to consumers, keyed by the
/// frame's payload kind (`"fac"`, `"mot"`, `"pow"`, `"met"`, `"com"`).
/// Each kind fans out to every registered consumer; senders whose
/// receiver was dropped are pruned as frames arrive.
///
/// Owned by the link, not the socket, so consumer channels survive a
/// socket swap on reconnect.
pub(crate) type FrameSenders =
    Arc<std::sync::Mutex<HashMap<&'static str, Vec<mpsc::Sender<serde_json::Value>>>>>;

/// A single WebSocket JSON-RPC connection to the Cortex service.
///
/// The writer is shared behind `Arc<Mutex>` so RPC calls can be made
/// concurrently; the reader runs in a background task that dispatches:
///
/// - **RPC responses** → matched by nonce `id` to pending `oneshot` channels
/// - **Data frames** → routed by payload kind to `mpsc` channels
pub(crate) struct CortexSocket {
    /// Shared write half of the WebSocket.
    writer: Arc<Mutex<WsWriter>>,

    /// Map of pending RPC calls awaiting responses, keyed by request ID.
    pending: Arc<Mutex<HashMap<u64, PendingResponse>>>,

    /// Auto-incrementing nonce counter for request IDs.
    next_id: AtomicU64,

    /// Handle to the background reader loop task.
    reader_handle: JoinHandle<()>,

    /// Whether the reader loop is currently running.
    reader_running: Arc<AtomicBool>,

    /// Becomes `true` when the socket closes for any reason.
    closed_rx: watch::Receiver<bool>,
}

impl CortexSocket {
    /// Dial the Cortex service and start the reader loop.
    ///
    /// `frame_senders` is owned by the caller; the reader holds a clone
    /// and routes data frames into whatever channels it contains at the
    /// time each frame arrives.
    pub(crate) async fn connect(
        config: &MuxConfig,
        frame_senders: FrameSenders,
    ) -> MuxResult<Self> {
        let url = &config.cortex_url;
        let accept_invalid_certs = config.should_accept_invalid_certs();

        let tls_connector = NativeTlsConnector::builder()
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| MuxError::ConnectionFailed {
                url: url.clone(),
                reason: format!("TLS configuration failed: {e}"),
            })?;

        let uri: http::Uri =
            url.parse()
                .map_err(|e: http::uri::InvalidUri| MuxError::ConnectionFailed {
                    url: url.clone(),
                    reason: format!("Invalid URL: {e}"),
                })?;

        let connect_fut = connect_async_tls_with_config(
            uri,
            None, // WebSocket config
            true, // disable_nagle
            Some(Connector::NativeTls(tls_connector)),
        );

        let (ws, response) = tokio::time::timeout(CONNECT_TIMEOUT, connect_fut)
            .await
            .map_err(|_| MuxError::ConnectionFailed {
                url: url.clone(),
                reason: format!("handshake timed out after {CONNECT_TIMEOUT:?}"),
            })?
            .map_err(|e| MuxError::ConnectionFailed {
                url: url.clone(),
                reason: format!("WebSocket connection failed: {e}"),
            })?;

        tracing::info!(url, status = %response.status(), "Connected to Cortex service");

        let (writer, reader) = ws.split();

        let pending: Arc<Mutex<HashMap<u64, PendingResponse>>> =
            Arc::new(Mutex::new(HashMap::new()));
        let reader_running = Arc::new(AtomicBool::new(true));
        let (closed_tx, closed_rx) = watch::channel(false);

        // The reader must be running before any call is made so that
        // responses can be dispatched.
        let reader_handle = Self::spawn_reader_loop(
            reader,
            Arc::clone(&pending),
            Arc::clone(&reader_running),
            frame_senders,
            closed_tx,
        );

        Ok(Self {
            writer: Arc::new(Mutex::new(writer)),
            pending,
            next_id: AtomicU64::new(1),
            reader_handle,
            reader_running,
            closed_rx,
        })
    }

    /// Spawn the background reader loop that dispatches WebSocket messages.
    fn spawn_reader_loop(
        mut reader: WsReader,
        pending: Arc<Mutex<HashMap<u64, PendingResponse>>>,
        running: Arc<AtomicBool>,
        frame_senders: FrameSenders,
        closed_tx: watch::Sender<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while running.load(Ordering::SeqCst) {
                let msg = tokio::select! {
                    msg = reader.next() => msg,
                    () = tokio::time::sleep(Duration::from_millis(100)) => continue,
                };

                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let value: serde_json::Value = match serde_json::from_str(&text) {
                            Ok(v) => v,
                            Err(e) => {
                                tracing::warn!("Non-JSON WebSocket message dropped: {e}");
                                continue;
                            }
                        };

                        // An `id` field marks an RPC response.
                        if let Some(id) = value.get("id").and_then(serde_json::Value::as_u64) {
                            let response: Result<RpcResponse, _> = serde_json::from_value(value);

                            let mut pending = pending.lock().await;
                            if let Some(tx) = pending.remove(&id) {
                                match response {
                                    Ok(resp) => {
                                        let result = if let Some(error) = resp.error {
                                            tracing::error!(
                                                id,
                                                code = error.code,
                                                message = %error.message,
                                                "Cortex API error in RPC response",
                                            );
                                            Err(MuxError::from_api_error(
                                                error.code,
                                                error.message,
                                            ))
                                        } else {
                                            resp.result.ok_or_else(|| MuxError::ProtocolError {
                                                reason: "response has no result or error".into(),
                                            })
                                        };
                                        let _ = tx.send(result);
                                    }
                                    Err(e) => {
                                        let _ = tx.send(Err(MuxError::ProtocolError {
                                            reason: format!("malformed RPC response: {e}"),
                                        }));
                                    }
                                }
                            } else {
                                tracing::debug!(id, "Response for unknown request ID");
                            }
                            continue;
                        }

                        // No id: a data frame. Fan out by payload kind
                        // to every registered consumer; try_send drops
                        // the frame when a consumer is behind rather
                        // than blocking the reader, and a closed
                        // channel drops the consumer itself.
                        if let Some(kind) = frame_kind(&value) {
                            if let Ok(mut senders) = frame_senders.lock() {
                                if let Some(list) = senders.get_mut(kind) {
                                    list.retain(|tx| {
                                        !matches!(
                                            tx.try_send(value.clone()),
                                            Err(mpsc::error::TrySendError::Closed(_))
                                        )
                                    });
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("Cortex WebSocket closed by server");
                        Self::drain_pending(&pending, "Cortex WebSocket closed").await;
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket read error: {e}");
                        Self::drain_pending(&pending, &format!("WebSocket error: {e}")).await;
                        break;
                    }
                    None => {
                        tracing::info!("Cortex WebSocket stream ended");
                        Self::drain_pending(&pending, "Cortex WebSocket stream ended").await;
                        break;
                    }
                    _ => {
                        // Binary messages, pings, pongs — skip
                    }
                }
            }

            tracing::debug!("Reader loop exiting");
            running.store(false, Ordering::SeqCst);
            let _ = closed_tx.send(true);
        })
    }

    /// Fail every pending call with `ConnectionLost`.
    async fn drain_pending(
        pending: &Arc<Mutex<HashMap<u64, PendingResponse>>>,
        reason: &str,
    ) {
        let mut pending = pending.lock().await;
        for (_, tx) in pending.drain() {
            let _ = tx.send(Err(MuxError::ConnectionLost {
                reason: reason.to_string(),
            }));
        }
    }

    /// Send a JSON-RPC request and wait for the matching response.
    pub(crate) async fn call(
        &self,
        method: &'static str,
        params: serde_json::Value,
    ) -> MuxResult<serde_json::Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = RpcRequest::new(id, method, params);

        let json = serde_json::to_string(&request).map_err(|e| MuxError::ProtocolError {
            reason: format!("serialize error: {e}"),
        })?;

        tracing::debug!(method, id, "Sending Cortex request");

        // Register the pending response before sending.
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().await;
            pending.insert(id, tx);
        }

        {
            let mut writer = self.writer.lock().await;
            if let Err(e) = writer.send(Message::Text(json.into())).await {
                self.pending.lock().await.remove(&id);
                return Err(MuxError::WebSocket(format!("send error: {e}")));
            }
        }

        // No timeout here: the reader loop delivers the response, or
        // drains this channel with ConnectionLost when the socket dies.
        let result = rx.await.map_err(|_| MuxError::ConnectionLost {
            reason: "response channel dropped (reader loop died)".into(),
        })??;

        tracing::debug!(method, id, "Cortex RPC succeeded");
        Ok(result)
    }

    /// Whether the reader loop is still running.
    pub(crate) fn is_open(&self) -> bool {
        self.reader_running.load(Ordering::SeqCst)
    }

    /// Resolve once the socket has closed for any reason.
    pub(crate) async fn wait_closed(&self) {
        let mut rx = self.closed_rx.clone();
        while !*rx.borrow() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Stop the reader loop and close the WebSocket.
    pub(crate) async fn close(&self) {
        self.reader_running.store(false, Ordering::SeqCst);

        let mut writer = self.writer.lock().await;
        let _ = writer.close().await;
        drop(writer);

        Self::drain_pending(&self.pending, "socket closed locally").await;
        self.reader_handle.abort();
    }
}
