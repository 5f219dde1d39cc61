//! # Stream adapters
//!
//! Typed consumer streams over the shared link.
//!
//! ## `TypedStream`
//!
//! [`TypedStream`] is a generic adapter that converts raw JSON frames
//! from an `mpsc` channel into typed values using a parser closure.
//! Frames that fail to parse are silently skipped.
//!
//! ## Consumer constructors
//!
//! Each constructor opens the frame channel for its payload kind,
//! ensures the stream is subscribed on the wire (at most one subscribe
//! process-wide, via the link's ledger), applies any per-consumer tuning
//! (facial threshold, mental command sensitivity), and returns a typed
//! `Stream`. Tuning failures degrade to a logged warning; they never
//! break the stream.
//!
//! Frame channels survive reconnects, but wire subscriptions do not:
//! listen for [`LinkEvent::Reconnected`](crate::reconnect::LinkEvent)
//! and call [`SharedLink::ensure_subscribed`] again.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::mpsc;

use crate::decode::{
    decode_band_power, decode_facial, decode_metric, decode_motion, Band, BandPowerOutput,
    MotionOutput, PerformanceMetric,
};
use crate::error::{MuxError, MuxResult};
use crate::headset::MotionMetric;
use crate::link::SharedLink;
use crate::protocol::frames;
use crate::protocol::{FacialFrame, Streams};

/// Generic stream adapter that receives raw JSON frames from an mpsc
/// channel and transforms them into typed values using a parser closure.
///
/// Frames that fail to parse are silently skipped (they may be malformed
/// or from an incompatible Cortex version).
pub struct TypedStream<T, F>
where
    F: Fn(serde_json::Value) -> Option<T>,
{
    rx: mpsc::Receiver<serde_json::Value>,
    parser: F,
}

impl<T, F> TypedStream<T, F>
where
    F: Fn(serde_json::Value) -> Option<T>,
{
    /// Create a new typed stream from a receiver and a parser function.
    pub fn new(rx: mpsc::Receiver<serde_json::Value>, parser: F) -> Self {
        Self { rx, parser }
    }
}

impl<T, F> Stream for TypedStream<T, F>
where
    T: Send,
    F: Fn(serde_json::Value) -> Option<T> + Unpin + Send,
{
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match self.rx.poll_recv(cx) {
                Poll::Ready(Some(frame)) => {
                    if let Some(parsed) = (self.parser)(frame) {
                        return Poll::Ready(Some(parsed));
                    }
                    // Parse failed — skip and try the next frame
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// A boxed typed stream, the return type of every constructor here.
pub type BoxStream<T> = Pin<Box<dyn Stream<Item = T> + Send>>;

// ─── Facial Expression ──────────────────────────────────────────────────

/// Configuration for a facial expression consumer.
#[derive(Debug, Clone)]
pub struct FacialConfig {
    /// The facial action to watch (e.g. `"smile"`, `"blink"`,
    /// `"eye-neutral"`).
    pub action: String,
    /// Profile to apply the threshold to, when one is set.
    pub profile: Option<String>,
    /// Detection threshold (0..=1000) applied after subscribing.
    pub threshold: Option<u32>,
}

/// Subscribe to facial expression frames, decoded against the
/// configured action: `1` for a matched eye action or neutral slot,
/// `ceil(power * 100)` for a matched powered slot, `0` otherwise.
pub async fn facial_stream(link: &SharedLink, config: FacialConfig) -> MuxResult<BoxStream<u32>> {
    let rx = link.frame_channel(Streams::FAC);
    link.ensure_subscribed(Streams::FAC).await?;

    if let (Some(profile), Some(threshold)) = (&config.profile, config.threshold) {
        match link
            .facial_expression_threshold(profile, &config.action, Some(threshold))
            .await
        {
            Ok(_) => tracing::debug!(action = %config.action, threshold, "Facial threshold set"),
            Err(MuxError::InvalidProfile { reason }) => {
                tracing::warn!(profile, reason, "Threshold not set; using default profile");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Facial threshold set failed");
            }
        }
    }

    let action = config.action;
    Ok(Box::pin(TypedStream::new(rx, move |frame| {
        let fac = FacialFrame::from_frame(&frame)?;
        Some(decode_facial(&fac, &action))
    })))
}

// ─── Mental Command ─────────────────────────────────────────────────────

/// Configuration for a mental command consumer.
#[derive(Debug, Clone)]
pub struct MentalCommandConfig {
    /// The mental command action to watch (e.g. `"push"`, `"lift"`).
    pub action: String,
    /// Sensitivity (1..=10), applied to all four action slots.
    pub sensitivity: Option<u32>,
}

/// Subscribe to mental command frames, decoded against the configured
/// action: frames for other actions are skipped, matches yield the
/// power rescaled to 0-100, rounded up.
pub async fn mental_command_stream(
    link: &SharedLink,
    config: MentalCommandConfig,
) -> MuxResult<BoxStream<u32>> {
    let rx = link.frame_channel(Streams::COM);
    link.ensure_subscribed(Streams::COM).await?;

    if let Some(sensitivity) = config.sensitivity {
        let values = [sensitivity; 4];
        if let Err(e) = link.mental_command_action_sensitivity(Some(&values)).await {
            tracing::warn!(error = %e, sensitivity, "Sensitivity set failed");
        }
    }

    let action = config.action;
    Ok(Box::pin(TypedStream::new(rx, move |frame| {
        let (act, power) = frames::mental_command(&frame)?;
        (act == action).then(|| crate::decode::rescale(power))
    })))
}

// ─── Band Power ─────────────────────────────────────────────────────────

/// Configuration for a frequency band power consumer.
#[derive(Debug, Clone, Copy)]
pub struct BandPowerConfig {
    pub band: Band,
    /// Sensor selector: `0` for all sensors, `n` for sensor `n - 1`.
    pub sensor: usize,
}

/// Subscribe to band power frames, decoded to the configured band and
/// sensor selector.
pub async fn band_power_stream(
    link: &SharedLink,
    config: BandPowerConfig,
) -> MuxResult<BoxStream<BandPowerOutput>> {
    let rx = link.frame_channel(Streams::POW);
    link.ensure_subscribed(Streams::POW).await?;

    Ok(Box::pin(TypedStream::new(rx, move |frame| {
        let pow = frames::band_power_values(&frame)?;
        decode_band_power(&pow, config.band, config.sensor)
    })))
}

// ─── Motion ─────────────────────────────────────────────────────────────

/// Subscribe to motion frames, decoded to one metric using the index
/// layout of the session's headset model.
pub async fn motion_stream(
    link: &SharedLink,
    metric: MotionMetric,
) -> MuxResult<BoxStream<MotionOutput>> {
    let layout = link.capabilities().await?.motion_layout;

    let rx = link.frame_channel(Streams::MOT);
    link.ensure_subscribed(Streams::MOT).await?;

    Ok(Box::pin(TypedStream::new(rx, move |frame| {
        let values = frames::motion_values(&frame)?;
        Some(decode_motion(&values, layout, metric))
    })))
}

// ─── Performance Metrics ────────────────────────────────────────────────

/// Subscribe to performance metric frames, decoded to one metric
/// rescaled to 0..=100. Frames where the metric's detection is inactive
/// are skipped.
pub async fn performance_metric_stream(
    link: &SharedLink,
    metric: PerformanceMetric,
) -> MuxResult<BoxStream<u32>> {
    let rx = link.frame_channel(Streams::MET);
    link.ensure_subscribed(Streams::MET).await?;

    Ok(Box::pin(TypedStream::new(rx, move |frame| {
        let met = frames::metric_values(&frame)?;
        decode_metric(&met, metric)
    })))
}
