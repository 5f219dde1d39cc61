//! Frequency band power decoder.
//!
//! The `pow` vector interleaves five band values per sensor:
//! `[s0.theta, s0.alpha, s0.betaL, s0.betaH, s0.gamma, s1.theta, ...]`.
//! A band's values are therefore every 5th element starting at the
//! band's offset.

/// The five frequency bands reported per sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    Theta,
    Alpha,
    BetaL,
    BetaH,
    Gamma,
}

/// Interleave stride: bands per sensor in the `pow` vector.
const BANDS_PER_SENSOR: usize = 5;

impl Band {
    /// Offset of this band within each sensor's group of five.
    #[must_use]
    pub fn offset(self) -> usize {
        match self {
            Band::Theta => 0,
            Band::Alpha => 1,
            Band::BetaL => 2,
            Band::BetaH => 3,
            Band::Gamma => 4,
        }
    }
}

/// Output of the band power decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum BandPowerOutput {
    /// All sensors' values for the band (sensor selector 0).
    All(Vec<f64>),
    /// A single sensor's value (selector `n` is sensor `n - 1`).
    Single(f64),
}

/// Decode one band, one sensor selector, from the interleaved vector.
///
/// Sensor selector `0` means "every sensor"; `n >= 1` selects sensor
/// `n - 1`. Returns `None` when the selected sensor is out of range.
/// Pure and idempotent: decoding the same frame twice yields the same
/// output.
#[must_use]
pub fn decode_band_power(pow: &[f64], band: Band, sensor: usize) -> Option<BandPowerOutput> {
    let per_band: Vec<f64> = pow
        .iter()
        .skip(band.offset())
        .step_by(BANDS_PER_SENSOR)
        .copied()
        .collect();

    if sensor == 0 {
        Some(BandPowerOutput::All(per_band))
    } else {
        per_band.get(sensor - 1).copied().map(BandPowerOutput::Single)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two sensors, five bands each.
    const POW: &[f64] = &[
        1.0, 2.0, 3.0, 4.0, 5.0, // sensor 0
        10.0, 20.0, 30.0, 40.0, 50.0, // sensor 1
    ];

    #[test]
    fn test_all_sensors() {
        assert_eq!(
            decode_band_power(POW, Band::Theta, 0),
            Some(BandPowerOutput::All(vec![1.0, 10.0]))
        );
        assert_eq!(
            decode_band_power(POW, Band::Gamma, 0),
            Some(BandPowerOutput::All(vec![5.0, 50.0]))
        );
    }

    #[test]
    fn test_single_sensor() {
        assert_eq!(
            decode_band_power(POW, Band::Alpha, 1),
            Some(BandPowerOutput::Single(2.0))
        );
        assert_eq!(
            decode_band_power(POW, Band::Alpha, 2),
            Some(BandPowerOutput::Single(20.0))
        );
    }

    #[test]
    fn test_sensor_out_of_range() {
        assert_eq!(decode_band_power(POW, Band::Theta, 3), None);
    }

    #[test]
    fn test_idempotent() {
        let once = decode_band_power(POW, Band::BetaH, 0);
        let twice = decode_band_power(POW, Band::BetaH, 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_vector() {
        assert_eq!(
            decode_band_power(&[], Band::Theta, 0),
            Some(BandPowerOutput::All(vec![]))
        );
        assert_eq!(decode_band_power(&[], Band::Theta, 1), None);
    }
}
