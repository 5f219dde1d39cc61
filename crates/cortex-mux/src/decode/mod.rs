//! Pure channel decoders.
//!
//! Each submodule turns a raw, headset-dependent sample vector into the
//! stable semantic value a consumer asked for. Decoders take plain data
//! and return plain data; they never touch the connection.

pub mod band;
pub mod facial;
pub mod metrics;
pub mod motion;

pub use band::{decode_band_power, Band, BandPowerOutput};
pub use facial::decode_facial;
pub use metrics::{decode_metric, PerformanceMetric};
pub use motion::{decode_motion, MotionOutput};

/// Rescale a unit-interval power value to a 0-100 integer, rounding
/// toward positive infinity so any nonzero power registers as at least 1.
#[must_use]
pub(crate) fn rescale(value: f64) -> u32 {
    let scaled = (value * 100.0).ceil();
    if scaled <= 0.0 {
        0
    } else if scaled >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            scaled as u32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::rescale;

    #[test]
    fn test_rescale_unit_interval() {
        assert_eq!(rescale(0.0), 0);
        assert_eq!(rescale(1.0), 100);
        assert_eq!(rescale(0.8), 80);
        assert_eq!(rescale(0.7), 70);
        assert_eq!(rescale(0.004), 1);
        // Any nonzero power registers
        assert_eq!(rescale(0.000_001), 1);
    }

    #[test]
    fn test_rescale_out_of_range_clamps() {
        assert_eq!(rescale(-0.5), 0);
        assert_eq!(rescale(f64::from(u32::MAX)), u32::MAX);
    }
}
