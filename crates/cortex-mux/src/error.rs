//! # Error Types
//!
//! Semantic error types for the shared Cortex connection and its adapters.
//!
//! ## Error Code Mapping
//!
//! The Cortex service returns numeric error codes in JSON-RPC error
//! responses. [`MuxError::from_api_error`] maps known codes to semantic
//! variants; everything else lands in the raw [`MuxError::Api`] variant,
//! which is reported but never terminates the process.

use thiserror::Error;

/// Convenient Result alias for multiplexer operations.
pub type MuxResult<T> = std::result::Result<T, MuxError>;

/// All errors that can occur on the shared connection or its adapters.
#[derive(Error, Debug)]
pub enum MuxError {
    // ─── Connection ─────────────────────────────────────────────────
    /// Failed to establish a WebSocket connection to the Cortex service.
    #[error("Failed to connect to Cortex at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// WebSocket connection was lost after being established.
    #[error("Connection to Cortex lost: {reason}")]
    ConnectionLost { reason: String },

    /// No session has been opened on the shared link yet.
    #[error("No active Cortex session")]
    NoSession,

    // ─── Authentication ─────────────────────────────────────────────
    /// Authentication failed (invalid client credentials or token).
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    /// The Cortex token has expired and needs to be refreshed.
    #[error("Cortex token expired — re-authentication required")]
    TokenExpired,

    /// User is not logged in via the Emotiv Launcher.
    #[error("User not logged in to EmotivID")]
    UserNotLoggedIn,

    // ─── Headset ────────────────────────────────────────────────────
    /// No headset found (either not paired or not powered on).
    #[error("No headset found. Ensure the headset is powered on and within range.")]
    NoHeadsetFound,

    /// Headset connection failed or the headset disconnected unexpectedly.
    #[error("Headset error: {reason}")]
    HeadsetError { reason: String },

    // ─── Session ────────────────────────────────────────────────────
    /// Session-related error (create, update, close failed).
    #[error("Session error: {reason}")]
    SessionError { reason: String },

    // ─── Streams ────────────────────────────────────────────────────
    /// Subscribe/unsubscribe failed for the requested streams.
    #[error("Stream error: {reason}")]
    StreamError { reason: String },

    // ─── Profiles ───────────────────────────────────────────────────
    /// The requested training profile does not exist or is invalid.
    #[error("Invalid profile: {reason}")]
    InvalidProfile { reason: String },

    /// The profile is loaded by another application.
    #[error("Profile conflict: {reason}")]
    ProfileConflict { reason: String },

    // ─── API ────────────────────────────────────────────────────────
    /// Raw Cortex API error that doesn't map to a more specific variant.
    #[error("Cortex API error {code}: {message}")]
    Api { code: i32, message: String },

    /// The requested API method was not found (likely a version mismatch).
    #[error("API method not found: {method}")]
    MethodNotFound { method: String },

    // ─── Protocol ───────────────────────────────────────────────────
    /// Received an unexpected or malformed message from the Cortex service.
    #[error("Protocol error: {reason}")]
    ProtocolError { reason: String },

    // ─── Config ─────────────────────────────────────────────────────
    /// Configuration file error (missing, malformed, or invalid values).
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    // ─── WebSocket ──────────────────────────────────────────────────
    /// Low-level WebSocket transport error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// TLS/SSL error during connection.
    #[error("TLS error: {0}")]
    Tls(String),

    // ─── I/O ────────────────────────────────────────────────────────
    /// Filesystem or I/O error (config file reading, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MuxError {
    /// Map a Cortex API error code + message to the most specific error variant.
    ///
    /// Known codes:
    /// - `-32601`: Method not found
    /// - `-32001`: No headset connected
    /// - `-32004`: Headset unavailable
    /// - `-32005`: Session already exists
    /// - `-32012`: Session must be activated
    /// - `-32014`: Invalid cortex token
    /// - `-32015`: Cortex token expired
    /// - `-32016`: Invalid stream
    /// - `-32020`: Invalid or unknown training profile
    /// - `-32021`: Invalid client credentials
    /// - `-32033`: User not logged in
    /// - `-32108`: Profile loaded by another application
    /// - `-32152`: Headset not ready
    pub fn from_api_error(code: i32, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            -32601 => MuxError::MethodNotFound {
                method: message.clone(),
            },
            -32001 | -32004 => MuxError::NoHeadsetFound,
            -32005 | -32012 => MuxError::SessionError { reason: message },
            -32014 | -32021 => MuxError::AuthenticationFailed { reason: message },
            -32015 => MuxError::TokenExpired,
            -32016 => MuxError::StreamError { reason: message },
            -32020 => MuxError::InvalidProfile { reason: message },
            -32033 => MuxError::UserNotLoggedIn,
            -32108 => MuxError::ProfileConflict { reason: message },
            -32152 => MuxError::HeadsetError { reason: message },
            _ => {
                // Older Cortex builds report the profile conflict with a
                // build-specific code; fall back to the message text.
                let lower = message.to_ascii_lowercase();
                if lower.contains("profile") && lower.contains("another app") {
                    MuxError::ProfileConflict { reason: message }
                } else {
                    MuxError::Api { code, message }
                }
            }
        }
    }

    /// Returns `true` if this error indicates the connection is dead
    /// and the reconnect supervisor will take over.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            MuxError::ConnectionFailed { .. }
                | MuxError::ConnectionLost { .. }
                | MuxError::WebSocket(_)
        )
    }
}

// ─── From impls for external error types ────────────────────────────────

impl From<tokio_tungstenite::tungstenite::Error> for MuxError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        MuxError::WebSocket(err.to_string())
    }
}

impl From<native_tls::Error> for MuxError {
    fn from(err: native_tls::Error) -> Self {
        MuxError::Tls(err.to_string())
    }
}

impl From<toml::de::Error> for MuxError {
    fn from(err: toml::de::Error) -> Self {
        MuxError::ConfigError {
            reason: err.to_string(),
        }
    }
}
