//! Unsolicited data-frame payload extraction.
//!
//! A data frame carries its sample vector under a key named after the
//! stream (`{"fac": [...], "sid": "...", "time": ...}`). These helpers
//! pull the vector out of the raw routed JSON; the decoders in
//! [`decode`](crate::decode) turn vectors into semantic values.

use crate::protocol::constants::Streams;

/// Classify a raw frame by the stream key it carries.
///
/// Returns `None` for frames that are not recognized data frames
/// (the response router logs and drops those).
pub fn frame_kind(value: &serde_json::Value) -> Option<&'static str> {
    Streams::ALL
        .iter()
        .copied()
        .find(|key| value.get(key).is_some())
}

/// A decoded facial expression frame: `[eye, upper, upperPower, lower, lowerPower]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FacialFrame {
    pub eye: String,
    pub upper: String,
    pub upper_power: f64,
    pub lower: String,
    pub lower_power: f64,
}

impl FacialFrame {
    /// Extract the 5-tuple from a raw `fac` frame.
    pub fn from_frame(value: &serde_json::Value) -> Option<Self> {
        let fac = value.get(Streams::FAC)?.as_array()?;
        Some(Self {
            eye: fac.first()?.as_str()?.to_string(),
            upper: fac.get(1)?.as_str()?.to_string(),
            upper_power: fac.get(2)?.as_f64()?,
            lower: fac.get(3)?.as_str()?.to_string(),
            lower_power: fac.get(4)?.as_f64()?,
        })
    }
}

/// Extract the motion sample vector from a raw `mot` frame.
///
/// The first two elements are the sample counter and interpolation flag;
/// they are metadata, not motion values, and are stripped here.
pub fn motion_values(value: &serde_json::Value) -> Option<Vec<f64>> {
    let mot = value.get(Streams::MOT)?.as_array()?;
    Some(
        mot.iter()
            .skip(2)
            .filter_map(serde_json::Value::as_f64)
            .collect(),
    )
}

/// Extract the interleaved band power vector from a raw `pow` frame.
pub fn band_power_values(value: &serde_json::Value) -> Option<Vec<f64>> {
    let pow = value.get(Streams::POW)?.as_array()?;
    pow.iter().map(serde_json::Value::as_f64).collect()
}

/// Extract the raw `met` vector from a performance metrics frame.
///
/// The vector mixes booleans (per-metric `isActive` flags) with numeric
/// values, so it is returned as JSON values; the metrics decoder indexes
/// into it by fixed position.
pub fn metric_values(value: &serde_json::Value) -> Option<Vec<serde_json::Value>> {
    Some(value.get(Streams::MET)?.as_array()?.clone())
}

/// Extract `(action, power)` from a raw `com` frame.
pub fn mental_command(value: &serde_json::Value) -> Option<(String, f64)> {
    let com = value.get(Streams::COM)?.as_array()?;
    let action = com.first()?.as_str()?.to_string();
    let power = com.get(1)?.as_f64()?;
    Some((action, power))
}
