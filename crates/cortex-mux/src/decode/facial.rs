//! Facial expression decoder.
//!
//! A facial frame is a 5-tuple `[eye, upper, upperPower, lower, lowerPower]`.
//! The service reports `neutral` in all three action slots; consumers
//! target a specific slot's neutral via the remapped names `eye-neutral`,
//! `uf-neutral`, and `lf-neutral`.
//!
//! Decoding rules for a target action:
//! - matched eye action, or a matched (remapped) neutral: `1`
//! - matched upper/lower action: power rescaled to 0-100, rounded up
//! - no match: `0`

use crate::decode::rescale;
use crate::protocol::frames::FacialFrame;

/// Eye and neutral slots have no power value on the wire.
const NEUTRAL: &str = "neutral";

/// Decode a facial frame against the consumer's target action.
#[must_use]
pub fn decode_facial(frame: &FacialFrame, target: &str) -> u32 {
    match target {
        "eye-neutral" => u32::from(frame.eye == NEUTRAL),
        "uf-neutral" => u32::from(frame.upper == NEUTRAL),
        "lf-neutral" => u32::from(frame.lower == NEUTRAL),
        // The slots' own `neutral` values are reachable only through
        // the remapped names above; the bare token matches nothing.
        NEUTRAL => 0,
        _ => {
            if frame.eye == target {
                1
            } else if frame.upper == target {
                rescale(frame.upper_power)
            } else if frame.lower == target {
                rescale(frame.lower_power)
            } else {
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(eye: &str, upper: &str, up: f64, lower: &str, lp: f64) -> FacialFrame {
        FacialFrame {
            eye: eye.into(),
            upper: upper.into(),
            upper_power: up,
            lower: lower.into(),
            lower_power: lp,
        }
    }

    #[test]
    fn test_powered_match_rescales() {
        let f = frame("neutral", "smirk_left", 0.8, "neutral", 0.0);
        assert_eq!(decode_facial(&f, "smirk_left"), 80);
    }

    #[test]
    fn test_eye_match_is_unit() {
        let f = frame("blink", "neutral", 0.0, "neutral", 0.0);
        assert_eq!(decode_facial(&f, "blink"), 1);
    }

    #[test]
    fn test_remapped_neutrals() {
        let f = frame("neutral", "smirk_left", 0.8, "neutral", 0.0);
        assert_eq!(decode_facial(&f, "eye-neutral"), 1);
        assert_eq!(decode_facial(&f, "uf-neutral"), 0);
        assert_eq!(decode_facial(&f, "lf-neutral"), 1);
    }

    #[test]
    fn test_unmatched_is_zero() {
        let f = frame("blink", "surprise", 0.4, "smile", 0.9);
        assert_eq!(decode_facial(&f, "frown"), 0);
    }

    #[test]
    fn test_lower_face_match() {
        let f = frame("neutral", "neutral", 0.0, "clench", 0.33);
        assert_eq!(decode_facial(&f, "clench"), 33);
    }

    #[test]
    fn test_bare_neutral_target_matches_nothing() {
        // Neutral slots are addressed only via the remapped names; the
        // bare token never matches, even when every slot is neutral.
        let f = frame("neutral", "neutral", 0.0, "neutral", 0.0);
        assert_eq!(decode_facial(&f, "neutral"), 0);

        let f = frame("neutral", "smirk_left", 0.8, "neutral", 0.0);
        assert_eq!(decode_facial(&f, "neutral"), 0);
    }

    #[test]
    fn test_tiny_power_rounds_up() {
        let f = frame("neutral", "surprise", 0.001, "neutral", 0.0);
        assert_eq!(decode_facial(&f, "surprise"), 1);
    }
}
