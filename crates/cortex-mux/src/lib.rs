//! # cortex-mux
//!
//! A shared-connection multiplexer for the Emotiv Cortex WebSocket API.
//!
//! One [`SharedLink`] carries every workflow in the process over a
//! single JSON-RPC WebSocket connection to the Cortex acquisition
//! service, and fans the inbound message stream out into independent,
//! typed data channels (facial expression, mental command, motion,
//! frequency band power, performance metrics).
//!
//! ## Quick Start
//!
//! ```ignore
//! use cortex_mux::{MuxConfig, SharedLink, streams};
//! use cortex_mux::decode::PerformanceMetric;
//! use futures_util::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> cortex_mux::MuxResult<()> {
//!     // Load config from environment or cortex-mux.toml
//!     let config = MuxConfig::discover(None)?;
//!
//!     // One connection, session, and reconnect supervisor for the
//!     // whole process
//!     let link = SharedLink::connect(config).await?;
//!
//!     // Any number of consumers; each stream is subscribed on the
//!     // wire exactly once
//!     let mut stress =
//!         streams::performance_metric_stream(&link, PerformanceMetric::Stress).await?;
//!
//!     while let Some(value) = stress.next().await {
//!         println!("stress: {value}");
//!     }
//!
//!     link.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## What the link guarantees
//!
//! - **Exactly-once subscription**: the subscription ledger ensures one
//!   wire `subscribe` per stream no matter how many consumers ask.
//! - **Correlation**: every RPC call carries a nonce ID; the response
//!   router delivers each response to exactly its caller.
//! - **Recovery**: a reconnect supervisor redials after connection
//!   loss, re-opens the session, and broadcasts [`reconnect::LinkEvent`]s.
//!   Consumers re-ensure their subscriptions on `Reconnected`; their
//!   frame channels stay valid across the swap.
//! - **Stable decoding**: raw headset-dependent sample vectors are
//!   decoded through per-model layouts into stable semantic outputs.
//!
//! ## Configuration
//!
//! See [`MuxConfig`]. The simplest setup uses environment variables:
//!
//! ```bash
//! export EMOTIV_CLIENT_ID="your-client-id"
//! export EMOTIV_CLIENT_SECRET="your-client-secret"
//! ```

pub mod config;
pub mod decode;
pub mod error;
pub mod headset;
pub mod link;
pub mod profile;
pub mod protocol;
pub mod reconnect;
pub mod streams;

mod socket;

// ─── Public re-exports ──────────────────────────────────────────────────

pub use config::MuxConfig;
pub use error::{MuxError, MuxResult};
pub use headset::{HeadsetCapabilities, HeadsetModel, MotionLayout, MotionMetric};
pub use link::{SessionContext, SharedLink};
pub use profile::{reconcile_profile, ProfileOutcome, GUEST_PROFILE};
pub use reconnect::LinkEvent;
pub use streams::TypedStream;
