//! Motion decoder.
//!
//! Looks a metric up in the headset's [`MotionLayout`] index table and
//! reads the value out of the stripped motion vector. Metrics the layout
//! does not carry produce a descriptive [`MotionOutput::Unavailable`]
//! instead of an error; data unavailability is an output, not a failure.

use crate::headset::{MotionLayout, MotionMetric};

/// Output of the motion decoder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionOutput {
    Value(f64),
    /// Metric not present on this headset; the reason says why.
    Unavailable(&'static str),
}

/// Decode one metric from a stripped motion vector.
#[must_use]
pub fn decode_motion(
    values: &[f64],
    layout: MotionLayout,
    metric: MotionMetric,
) -> MotionOutput {
    match layout.index_of(metric) {
        Some(index) => match values.get(index) {
            Some(value) => MotionOutput::Value(*value),
            None => MotionOutput::Unavailable("motion sample shorter than expected"),
        },
        None => MotionOutput::Unavailable(layout.unavailable_reason(metric)),
    }
}
