//! # Shared Cortex link
//!
//! One [`SharedLink`] multiplexes every workflow's RPC calls and data
//! frames over a single WebSocket connection. It owns:
//!
//! - the active [`CortexSocket`] (swapped in place on reconnect)
//! - the subscription ledger, so each stream is subscribed exactly once
//!   no matter how many workflows ask for it
//! - the frame channels that data frames are routed into
//! - the session context (token, session ID, headset capabilities)
//!
//! A reconnect supervisor task watches the socket and redials when it
//! drops; see [`crate::reconnect`].

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::{broadcast, mpsc, Mutex, RwLock};

use crate::config::MuxConfig;
use crate::error::{MuxError, MuxResult};
use crate::headset::HeadsetCapabilities;
use crate::protocol::{CurrentProfileInfo, Methods, ProfileAction, ProfileInfo};
use crate::reconnect::{spawn_supervisor, LinkEvent};
use crate::socket::{CortexSocket, FrameSenders, FRAME_CHANNEL_BUFFER};

/// Everything needed to use an open session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// The cortex token from `authorize`.
    pub auth: String,
    /// The active session ID from `createSession`.
    pub session_id: String,
    /// The headset the session was created for.
    pub headset_id: String,
    /// Model-derived capabilities of that headset.
    pub capabilities: HeadsetCapabilities,
}

/// A shared, reconnecting Cortex connection.
///
/// Cheap to share: wrap in `Arc` (as [`SharedLink::connect`] returns)
/// and hand clones to every workflow. All methods take `&self`.
pub struct SharedLink {
    config: MuxConfig,

    /// The active socket. Replaced wholesale by the supervisor after a
    /// successful reconnect; in-flight calls on the old socket fail
    /// with `ConnectionLost`.
    socket: RwLock<Arc<CortexSocket>>,

    /// Frame channels, shared with every socket's reader loop so
    /// consumers keep their receivers across reconnects.
    frame_senders: FrameSenders,

    /// Streams currently subscribed on the wire. Guarded by an async
    /// mutex held across the subscribe call itself, so two workflows
    /// racing on the same stream produce exactly one wire request.
    ledger: Mutex<HashSet<String>>,

    /// Session context, refreshed by the supervisor on reconnect.
    session: RwLock<Option<SessionContext>>,

    /// Set by [`shutdown`](Self::shutdown); tells the supervisor the
    /// close was deliberate.
    closing: AtomicBool,

    event_tx: broadcast::Sender<LinkEvent>,
}

impl SharedLink {
    /// Connect to the Cortex service, open a session, and start the
    /// reconnect supervisor.
    pub async fn connect(config: MuxConfig) -> MuxResult<Arc<Self>> {
        let frame_senders: FrameSenders =
            Arc::new(std::sync::Mutex::new(std::collections::HashMap::new()));

        let socket = CortexSocket::connect(&config, Arc::clone(&frame_senders)).await?;
        let session = Self::open_session(&socket, &config).await?;

        let (event_tx, _) = broadcast::channel(64);
        let _ = event_tx.send(LinkEvent::Connected);

        let link = Arc::new(Self {
            config,
            socket: RwLock::new(Arc::new(socket)),
            frame_senders,
            ledger: Mutex::new(HashSet::new()),
            session: RwLock::new(Some(session)),
            closing: AtomicBool::new(false),
            event_tx,
        });

        if link.config.reconnect.enabled {
            spawn_supervisor(Arc::clone(&link));
        }

        Ok(link)
    }

    /// Subscribe to connection lifecycle events.
    pub fn events(&self) -> broadcast::Receiver<LinkEvent> {
        self.event_tx.subscribe()
    }

    /// Run the session bootstrap on a freshly dialed socket:
    /// `requestAccess` → `authorize` → `queryHeadsets` →
    /// `controlDevice connect` → `createSession`.
    pub(crate) async fn open_session(
        socket: &CortexSocket,
        config: &MuxConfig,
    ) -> MuxResult<SessionContext> {
        // requestAccess is absent on some Cortex builds where the
        // Launcher handles app approval directly.
        match socket
            .call(
                Methods::REQUEST_ACCESS,
                json!({
                    "clientId": config.client_id,
                    "clientSecret": config.client_secret,
                }),
            )
            .await
        {
            Ok(_) => tracing::debug!("Cortex access requested"),
            Err(MuxError::MethodNotFound { .. }) => {
                tracing::info!("requestAccess not available on this Cortex version");
            }
            Err(e) => return Err(e),
        }

        let auth_result = socket
            .call(
                Methods::AUTHORIZE,
                json!({
                    "clientId": config.client_id,
                    "clientSecret": config.client_secret,
                }),
            )
            .await?;

        let auth = auth_result
            .get("cortexToken")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| MuxError::ProtocolError {
                reason: "authorize response missing cortexToken".into(),
            })?
            .to_string();

        let headsets = socket.call(Methods::QUERY_HEADSETS, json!({})).await?;
        let headsets = headsets.as_array().ok_or_else(|| MuxError::ProtocolError {
            reason: "queryHeadsets did not return an array".into(),
        })?;

        let headset_id = match &config.headset_id {
            Some(wanted) => headsets
                .iter()
                .filter_map(|h| h.get("id").and_then(serde_json::Value::as_str))
                .find(|id| id == wanted)
                .ok_or(MuxError::NoHeadsetFound)?
                .to_string(),
            None => headsets
                .first()
                .and_then(|h| h.get("id"))
                .and_then(serde_json::Value::as_str)
                .ok_or(MuxError::NoHeadsetFound)?
                .to_string(),
        };

        socket
            .call(
                Methods::CONTROL_DEVICE,
                json!({
                    "command": "connect",
                    "headset": headset_id,
                }),
            )
            .await?;

        let session_result = socket
            .call(
                Methods::CREATE_SESSION,
                json!({
                    "cortexToken": auth,
                    "headset": headset_id,
                    "status": "active",
                }),
            )
            .await?;

        let session_id = session_result
            .get("id")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| MuxError::ProtocolError {
                reason: "createSession response missing id".into(),
            })?
            .to_string();

        let capabilities = HeadsetCapabilities::resolve(&headset_id);
        tracing::info!(
            session_id,
            headset = headset_id,
            model = %capabilities.model,
            "Cortex session opened"
        );

        Ok(SessionContext {
            auth,
            session_id,
            headset_id,
            capabilities,
        })
    }

    // ─── Internal helpers ────────────────────────────────────────────────

    async fn socket(&self) -> Arc<CortexSocket> {
        Arc::clone(&*self.socket.read().await)
    }

    async fn call(
        &self,
        method: &'static str,
        params: serde_json::Value,
    ) -> MuxResult<serde_json::Value> {
        self.socket().await.call(method, params).await
    }

    async fn session_context(&self) -> MuxResult<SessionContext> {
        self.session
            .read()
            .await
            .clone()
            .ok_or(MuxError::NoSession)
    }

    // ─── Session accessors ───────────────────────────────────────────────

    /// The current cortex token.
    pub async fn cortex_token(&self) -> MuxResult<String> {
        Ok(self.session_context().await?.auth)
    }

    /// The current session ID.
    pub async fn session_id(&self) -> MuxResult<String> {
        Ok(self.session_context().await?.session_id)
    }

    /// Capabilities of the headset the session runs on.
    pub async fn capabilities(&self) -> MuxResult<HeadsetCapabilities> {
        Ok(self.session_context().await?.capabilities)
    }

    /// Change the session status (`"active"`, `"open"`, or `"close"`).
    pub async fn update_session(&self, status: &str) -> MuxResult<serde_json::Value> {
        let session = self.session_context().await?;
        self.call(
            Methods::UPDATE_SESSION,
            json!({
                "cortexToken": session.auth,
                "session": session.session_id,
                "status": status,
            }),
        )
        .await
    }

    // ─── Subscriptions ───────────────────────────────────────────────────

    /// Subscribe the session to `stream` unless the ledger already has
    /// it. Returns `true` when a wire subscribe was actually sent.
    ///
    /// The ledger lock is held across the wire call, so concurrent
    /// callers for the same stream serialize and the second one sees
    /// the entry the first inserted.
    pub async fn ensure_subscribed(&self, stream: &str) -> MuxResult<bool> {
        let session = self.session_context().await?;

        let mut ledger = self.ledger.lock().await;
        if ledger.contains(stream) {
            return Ok(false);
        }

        let result = self
            .call(
                Methods::SUBSCRIBE,
                json!({
                    "cortexToken": session.auth,
                    "session": session.session_id,
                    "streams": [stream],
                }),
            )
            .await?;

        // A failed stream comes back in the failure list rather than as
        // an RPC error.
        if let Some(failures) = result.get("failure").and_then(serde_json::Value::as_array) {
            for failure in failures {
                if failure.get("streamName").and_then(serde_json::Value::as_str) == Some(stream) {
                    let reason = failure
                        .get("message")
                        .and_then(serde_json::Value::as_str)
                        .unwrap_or("subscribe rejected")
                        .to_string();
                    return Err(MuxError::StreamError { reason });
                }
            }
        }

        ledger.insert(stream.to_string());
        tracing::info!(stream, "Subscribed to data stream");
        Ok(true)
    }

    /// Unsubscribe the session from `stream`. Returns `false` when the
    /// ledger had no entry for it (nothing sent).
    pub async fn unsubscribe(&self, stream: &str) -> MuxResult<bool> {
        let session = self.session_context().await?;

        let mut ledger = self.ledger.lock().await;
        if !ledger.contains(stream) {
            return Ok(false);
        }

        self.call(
            Methods::UNSUBSCRIBE,
            json!({
                "cortexToken": session.auth,
                "session": session.session_id,
                "streams": [stream],
            }),
        )
        .await?;

        ledger.remove(stream);
        tracing::info!(stream, "Unsubscribed from data stream");
        Ok(true)
    }

    /// Open a receiver for frames of the given payload kind (`"fac"`,
    /// `"mot"`, `"pow"`, `"met"`, `"com"`). Any number of consumers can
    /// hold a receiver for the same kind; each frame is fanned out to
    /// all of them, and dropping a receiver detaches that consumer
    /// without disturbing the others. The channel survives reconnects.
    pub fn frame_channel(&self, kind: &'static str) -> mpsc::Receiver<serde_json::Value> {
        let (tx, rx) = mpsc::channel(FRAME_CHANNEL_BUFFER);
        if let Ok(mut senders) = self.frame_senders.lock() {
            senders.entry(kind).or_default().push(tx);
        }
        rx
    }

    // ─── Authentication / user ───────────────────────────────────────────

    /// Check whether the application has been granted access rights.
    pub async fn has_access_right(&self) -> MuxResult<bool> {
        let result = self
            .call(
                Methods::HAS_ACCESS_RIGHT,
                json!({
                    "clientId": self.config.client_id,
                    "clientSecret": self.config.client_secret,
                }),
            )
            .await?;

        Ok(result
            .get("accessGranted")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false))
    }

    /// Get the currently logged-in EmotivID user(s).
    pub async fn get_user_login(&self) -> MuxResult<serde_json::Value> {
        self.call(Methods::GET_USER_LOGIN, json!({})).await
    }

    /// Log a user in via the Cortex service.
    pub async fn login(&self, username: &str, password: &str) -> MuxResult<serde_json::Value> {
        self.call(
            Methods::LOGIN,
            json!({
                "username": username,
                "password": password,
                "clientId": self.config.client_id,
                "clientSecret": self.config.client_secret,
            }),
        )
        .await
    }

    /// Log a user out of the Cortex service.
    pub async fn logout(&self, username: &str) -> MuxResult<serde_json::Value> {
        self.call(Methods::LOGOUT, json!({ "username": username }))
            .await
    }

    // ─── Profiles ────────────────────────────────────────────────────────

    /// List all training profiles for the current user.
    pub async fn query_profile(&self) -> MuxResult<Vec<ProfileInfo>> {
        let session = self.session_context().await?;
        let result = self
            .call(
                Methods::QUERY_PROFILE,
                json!({ "cortexToken": session.auth }),
            )
            .await?;

        serde_json::from_value(result).map_err(|e| MuxError::ProtocolError {
            reason: format!("failed to parse profile list: {e}"),
        })
    }

    /// Get the profile currently loaded on the session's headset.
    pub async fn get_current_profile(&self) -> MuxResult<CurrentProfileInfo> {
        let session = self.session_context().await?;
        let result = self
            .call(
                Methods::GET_CURRENT_PROFILE,
                json!({
                    "cortexToken": session.auth,
                    "headset": session.headset_id,
                }),
            )
            .await?;

        if result.is_null() {
            return Ok(CurrentProfileInfo::default());
        }

        serde_json::from_value(result).map_err(|e| MuxError::ProtocolError {
            reason: format!("failed to parse current profile: {e}"),
        })
    }

    /// Run a profile action (load, unload, create, save) on the
    /// session's headset.
    pub async fn setup_profile(&self, profile: &str, action: ProfileAction) -> MuxResult<()> {
        let session = self.session_context().await?;
        self.call(
            Methods::SETUP_PROFILE,
            json!({
                "cortexToken": session.auth,
                "headset": session.headset_id,
                "profile": profile,
                "status": action.as_str(),
            }),
        )
        .await?;

        tracing::info!(profile, action = action.as_str(), "Profile action completed");
        Ok(())
    }

    /// Load the empty guest profile on the session's headset.
    pub async fn load_guest_profile(&self) -> MuxResult<()> {
        let session = self.session_context().await?;
        self.call(
            Methods::LOAD_GUEST_PROFILE,
            json!({
                "cortexToken": session.auth,
                "headset": session.headset_id,
            }),
        )
        .await?;

        tracing::info!(headset = session.headset_id, "Guest profile loaded");
        Ok(())
    }

    // ─── Detections ──────────────────────────────────────────────────────

    /// Get detection info for `"mentalCommand"` or `"facialExpression"`.
    pub async fn get_detection_info(&self, detection: &str) -> MuxResult<serde_json::Value> {
        self.call(Methods::GET_DETECTION_INFO, json!({ "detection": detection }))
            .await
    }

    /// List the trained actions of a profile for a detection type.
    pub async fn get_trained_signature_actions(
        &self,
        detection: &str,
        profile: &str,
    ) -> MuxResult<serde_json::Value> {
        let session = self.session_context().await?;
        self.call(
            Methods::GET_TRAINED_SIGNATURE_ACTIONS,
            json!({
                "cortexToken": session.auth,
                "detection": detection,
                "profile": profile,
            }),
        )
        .await
    }

    /// Get or set the threshold of a facial expression action on a
    /// profile. `value` present means set.
    pub async fn facial_expression_threshold(
        &self,
        profile: &str,
        action: &str,
        value: Option<u32>,
    ) -> MuxResult<serde_json::Value> {
        let session = self.session_context().await?;
        let mut params = json!({
            "cortexToken": session.auth,
            "status": if value.is_some() { "set" } else { "get" },
            "action": action,
            "profile": profile,
        });
        if let Some(v) = value {
            params["value"] = json!(v);
        }

        self.call(Methods::FACIAL_EXPRESSION_THRESHOLD, params).await
    }

    /// Get or set the active mental command actions for the session.
    pub async fn mental_command_active_action(
        &self,
        actions: Option<&[&str]>,
    ) -> MuxResult<serde_json::Value> {
        let session = self.session_context().await?;
        let mut params = json!({
            "cortexToken": session.auth,
            "session": session.session_id,
            "status": if actions.is_some() { "set" } else { "get" },
        });
        if let Some(actions) = actions {
            params["actions"] = json!(actions);
        }

        self.call(Methods::MENTAL_COMMAND_ACTIVE_ACTION, params).await
    }

    /// Get or set the mental command action sensitivity (four values,
    /// each 1..=10).
    pub async fn mental_command_action_sensitivity(
        &self,
        values: Option<&[u32]>,
    ) -> MuxResult<serde_json::Value> {
        let session = self.session_context().await?;
        let mut params = json!({
            "cortexToken": session.auth,
            "session": session.session_id,
            "status": if values.is_some() { "set" } else { "get" },
        });
        if let Some(values) = values {
            params["values"] = json!(values);
        }

        self.call(Methods::MENTAL_COMMAND_ACTION_SENSITIVITY, params)
            .await
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Whether the underlying socket is currently open.
    pub async fn is_connected(&self) -> bool {
        self.socket().await.is_open()
    }

    /// Close the session and the socket. The supervisor sees the
    /// closing flag and does not reconnect.
    pub async fn shutdown(&self) {
        self.closing.store(true, Ordering::SeqCst);

        // Best-effort session close; the service reaps it anyway, so
        // give up quickly if it does not answer.
        let _ = tokio::time::timeout(Duration::from_secs(1), self.update_session("close")).await;

        self.socket().await.close().await;
        let _ = self.event_tx.send(LinkEvent::Disconnected {
            reason: "client shutdown".into(),
        });
        tracing::info!("Shared link shut down");
    }

    // ─── Supervisor hooks ────────────────────────────────────────────────

    pub(crate) fn config(&self) -> &MuxConfig {
        &self.config
    }

    pub(crate) fn frame_senders(&self) -> FrameSenders {
        Arc::clone(&self.frame_senders)
    }

    pub(crate) fn is_closing(&self) -> bool {
        self.closing.load(Ordering::SeqCst)
    }

    pub(crate) fn emit(&self, event: LinkEvent) {
        let _ = self.event_tx.send(event);
    }

    pub(crate) async fn current_socket(&self) -> Arc<CortexSocket> {
        self.socket().await
    }

    pub(crate) async fn has_session(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Wipe the subscription ledger. Wire subscriptions died with the
    /// session; consumers must re-ensure after a reconnect.
    pub(crate) async fn clear_ledger(&self) {
        let mut ledger = self.ledger.lock().await;
        if !ledger.is_empty() {
            tracing::debug!(count = ledger.len(), "Clearing subscription ledger");
            ledger.clear();
        }
    }

    /// Swap in a freshly dialed socket (and, when one was re-opened,
    /// its new session context).
    pub(crate) async fn swap_socket(
        &self,
        new_socket: CortexSocket,
        new_session: Option<SessionContext>,
    ) {
        {
            let mut socket = self.socket.write().await;
            *socket = Arc::new(new_socket);
        }
        if new_session.is_some() {
            let mut session = self.session.write().await;
            *session = new_session;
        }
    }
}
