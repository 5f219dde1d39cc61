//! # Configuration
//!
//! [`MuxConfig`] holds everything needed to open the shared connection.
//!
//! ## Loading Priority
//!
//! Configuration is loaded from the first source that provides a value:
//!
//! 1. Explicit struct fields (programmatic construction)
//! 2. Environment variables (`EMOTIV_CLIENT_ID`, `EMOTIV_CLIENT_SECRET`, etc.)
//! 3. TOML config file at an explicit path
//! 4. `./cortex-mux.toml` in the current directory

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{MuxError, MuxResult};

/// Default Cortex WebSocket URL (localhost, self-signed TLS).
pub const DEFAULT_CORTEX_URL: &str = "wss://localhost:6868";

/// Default delay before a reconnect attempt, in milliseconds.
const DEFAULT_RECONNECT_DELAY_MS: u64 = 3000;

/// Configuration for the shared Cortex connection.
///
/// # Examples
///
/// ```
/// use cortex_mux::config::MuxConfig;
///
/// let config = MuxConfig::new("my-client-id", "my-client-secret");
/// assert_eq!(config.cortex_url, "wss://localhost:6868");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuxConfig {
    /// Cortex API client ID from the Emotiv developer portal.
    pub client_id: String,

    /// Cortex API client secret.
    pub client_secret: String,

    /// WebSocket URL for the Cortex service.
    #[serde(default = "default_cortex_url")]
    pub cortex_url: String,

    /// Headset ID to bind the session to. When unset, the first headset
    /// reported by `queryHeadsets` is used.
    #[serde(default)]
    pub headset_id: Option<String>,

    /// Allow insecure TLS connections to non-localhost hosts.
    /// Only enable this for development/testing.
    #[serde(default)]
    pub allow_insecure_tls: bool,

    /// Auto-reconnect configuration.
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

/// Auto-reconnect behavior when the WebSocket connection drops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Enable auto-reconnect on connection loss.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Fixed delay between a detected closure and the redial, in milliseconds.
    #[serde(default = "default_reconnect_delay")]
    pub delay_ms: u64,
}

// ─── Defaults ───────────────────────────────────────────────────────────

fn default_cortex_url() -> String {
    DEFAULT_CORTEX_URL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_reconnect_delay() -> u64 {
    DEFAULT_RECONNECT_DELAY_MS
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: DEFAULT_RECONNECT_DELAY_MS,
        }
    }
}

// ─── MuxConfig impl ─────────────────────────────────────────────────────

impl MuxConfig {
    /// Create a config with just client credentials (all other fields use defaults).
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            cortex_url: default_cortex_url(),
            headset_id: None,
            allow_insecure_tls: false,
            reconnect: ReconnectConfig::default(),
        }
    }

    /// Load config from environment variables.
    ///
    /// Required: `EMOTIV_CLIENT_ID`, `EMOTIV_CLIENT_SECRET`
    ///
    /// Optional: `EMOTIV_CORTEX_URL`, `EMOTIV_HEADSET_ID`
    pub fn from_env() -> MuxResult<Self> {
        let client_id = std::env::var("EMOTIV_CLIENT_ID").map_err(|_| MuxError::ConfigError {
            reason: "EMOTIV_CLIENT_ID environment variable not set".into(),
        })?;
        let client_secret =
            std::env::var("EMOTIV_CLIENT_SECRET").map_err(|_| MuxError::ConfigError {
                reason: "EMOTIV_CLIENT_SECRET environment variable not set".into(),
            })?;

        let mut config = Self::new(client_id, client_secret);

        if let Ok(url) = std::env::var("EMOTIV_CORTEX_URL") {
            config.cortex_url = url;
        }
        if let Ok(headset) = std::env::var("EMOTIV_HEADSET_ID") {
            config.headset_id = Some(headset);
        }

        Ok(config)
    }

    /// Load config from a TOML file, with environment variable overrides.
    ///
    /// Environment variables take precedence over file values for
    /// `client_id`, `client_secret`, `cortex_url`, and `headset_id`.
    pub fn from_file(path: impl AsRef<Path>) -> MuxResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| MuxError::ConfigError {
            reason: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;
        let mut config: Self = toml::from_str(&contents)?;

        if let Ok(id) = std::env::var("EMOTIV_CLIENT_ID") {
            config.client_id = id;
        }
        if let Ok(secret) = std::env::var("EMOTIV_CLIENT_SECRET") {
            config.client_secret = secret;
        }
        if let Ok(url) = std::env::var("EMOTIV_CORTEX_URL") {
            config.cortex_url = url;
        }
        if let Ok(headset) = std::env::var("EMOTIV_HEADSET_ID") {
            config.headset_id = Some(headset);
        }

        Ok(config)
    }

    /// Discover and load config from the standard search path:
    ///
    /// 1. Explicit path (if `Some`)
    /// 2. `CORTEX_MUX_CONFIG` environment variable
    /// 3. `./cortex-mux.toml`
    ///
    /// Falls back to environment-variable-only config if no file is found.
    pub fn discover(explicit_path: Option<&Path>) -> MuxResult<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var("CORTEX_MUX_CONFIG") {
            let path = std::path::PathBuf::from(path);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        let local_path = std::path::PathBuf::from("cortex-mux.toml");
        if local_path.exists() {
            return Self::from_file(&local_path);
        }

        Self::from_env()
    }

    /// Returns `true` if insecure TLS should be allowed for the configured URL.
    ///
    /// Insecure TLS is always allowed for `localhost` and `127.0.0.1`
    /// (the Cortex service uses a self-signed cert). For other hosts,
    /// `allow_insecure_tls` must be explicitly set.
    pub fn should_accept_invalid_certs(&self) -> bool {
        if is_localhost(&self.cortex_url) {
            return true;
        }
        self.allow_insecure_tls
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

/// Check if a WebSocket URL points to localhost.
fn is_localhost(url: &str) -> bool {
    let authority = url
        .strip_prefix("wss://")
        .or_else(|| url.strip_prefix("ws://"))
        .unwrap_or(url);

    // Handle IPv6 bracket notation: [::1]:6868
    if let Some(rest) = authority.strip_prefix('[') {
        let host = rest.split(']').next().unwrap_or("");
        return host == "::1";
    }

    // Regular host:port — split on last colon to separate port
    let host = if let Some(idx) = authority.rfind(':') {
        &authority[..idx]
    } else {
        authority
    };
    matches!(host, "localhost" | "127.0.0.1")
}
