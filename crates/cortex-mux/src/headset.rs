//! # Headset Model Identification & Motion Capabilities
//!
//! Provides [`HeadsetModel`] for identifying Emotiv headset variants from
//! their Cortex ID string, and [`MotionLayout`] for the per-model layout
//! of the motion sample vector.
//!
//! ## Motion vector layouts
//!
//! | Layout | Vector contents |
//! |--------|-----------------|
//! | GyroAccelMag | gyro x/y/z, acc x/y/z, mag x/y/z |
//! | QuatAccelMag | q0..q3, acc x/y/z, mag x/y/z |
//! | QuatOnly | q0..q3 |
//!
//! Older headsets (EPOC+, EPOC Flex, first-generation Insight) report
//! gyroscope axes; newer ones report the fused quaternion instead. The
//! MN8 earbuds report only the quaternion.

use serde::{Deserialize, Serialize};

/// Emotiv headset model identifier.
///
/// Inferred from the headset ID string returned by `queryHeadsets`.
/// Emotiv headset IDs follow patterns like `INSIGHT-XXXXXXXX`,
/// `EPOCX-XXXXXXXX`, `MN8-XXXXXXXX`, etc.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeadsetModel {
    /// Emotiv Insight — 5 EEG channels.
    Insight,

    /// Emotiv EPOC+ — 14 EEG channels.
    EpocPlus,

    /// Emotiv EPOC X — 14 EEG channels.
    EpocX,

    /// Emotiv EPOC Flex — configurable channel count.
    EpocFlex,

    /// Emotiv MN8 earbuds — 2 EEG channels, quaternion-only motion.
    Mn8,

    /// Unknown or unrecognized Emotiv headset.
    Unknown(String),
}

impl HeadsetModel {
    /// Infer the headset model from a headset ID string.
    ///
    /// ```
    /// use cortex_mux::headset::HeadsetModel;
    ///
    /// assert_eq!(HeadsetModel::from_headset_id("INSIGHT-12345678"), HeadsetModel::Insight);
    /// assert_eq!(HeadsetModel::from_headset_id("EPOCX-AABBCCDD"), HeadsetModel::EpocX);
    /// assert_eq!(HeadsetModel::from_headset_id("MN8-99887766"), HeadsetModel::Mn8);
    /// ```
    #[must_use]
    pub fn from_headset_id(headset_id: &str) -> Self {
        let id_upper = headset_id.to_uppercase();

        if id_upper.starts_with("INSIGHT") {
            HeadsetModel::Insight
        } else if id_upper.starts_with("EPOCX") || id_upper.starts_with("EPOC-X") {
            HeadsetModel::EpocX
        } else if id_upper.starts_with("EPOCFLEX") {
            HeadsetModel::EpocFlex
        } else if id_upper.starts_with("EPOCPLUS")
            || id_upper.starts_with("EPOC+")
            || id_upper.starts_with("EPOC")
        {
            HeadsetModel::EpocPlus
        } else if id_upper.starts_with("MN8") {
            HeadsetModel::Mn8
        } else {
            HeadsetModel::Unknown(headset_id.to_string())
        }
    }

    /// Motion vector layout for this model.
    #[must_use]
    pub fn motion_layout(&self) -> MotionLayout {
        match self {
            HeadsetModel::EpocX => MotionLayout::QuatAccelMag,
            HeadsetModel::Mn8 => MotionLayout::QuatOnly,
            HeadsetModel::Insight
            | HeadsetModel::EpocPlus
            | HeadsetModel::EpocFlex
            | HeadsetModel::Unknown(_) => MotionLayout::GyroAccelMag,
        }
    }
}

impl std::fmt::Display for HeadsetModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeadsetModel::Insight => write!(f, "Insight"),
            HeadsetModel::EpocPlus => write!(f, "EPOC+"),
            HeadsetModel::EpocX => write!(f, "EPOC X"),
            HeadsetModel::EpocFlex => write!(f, "EPOC Flex"),
            HeadsetModel::Mn8 => write!(f, "MN8"),
            HeadsetModel::Unknown(id) => write!(f, "Unknown ({id})"),
        }
    }
}

// ─── Motion layout ──────────────────────────────────────────────────────

/// Layout of the motion sample vector, after the two leading metadata
/// fields have been stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionLayout {
    /// gyro x/y/z at 0-2, acc x/y/z at 3-5, mag x/y/z at 6-8.
    GyroAccelMag,
    /// q0-q3 at 0-3, acc x/y/z at 4-6, mag x/y/z at 7-9.
    QuatAccelMag,
    /// q0-q3 at 0-3, nothing else.
    QuatOnly,
}

impl MotionLayout {
    /// Infer the layout from the length of a stripped motion vector.
    ///
    /// Useful when a frame arrives before `queryHeadsets` has resolved
    /// the model, or for unknown models.
    #[must_use]
    pub fn from_sample_len(len: usize) -> Option<Self> {
        match len {
            9 => Some(MotionLayout::GyroAccelMag),
            10 => Some(MotionLayout::QuatAccelMag),
            4 => Some(MotionLayout::QuatOnly),
            _ => None,
        }
    }

    /// Index of a motion metric in this layout, or `None` if the metric
    /// is not present on headsets with this layout.
    #[must_use]
    pub fn index_of(self, metric: MotionMetric) -> Option<usize> {
        use MotionMetric::*;
        match self {
            MotionLayout::GyroAccelMag => match metric {
                GyroX => Some(0),
                GyroY => Some(1),
                GyroZ => Some(2),
                AccX => Some(3),
                AccY => Some(4),
                AccZ => Some(5),
                MagX => Some(6),
                MagY => Some(7),
                MagZ => Some(8),
                Q0 | Q1 | Q2 | Q3 => None,
            },
            MotionLayout::QuatAccelMag => match metric {
                Q0 => Some(0),
                Q1 => Some(1),
                Q2 => Some(2),
                Q3 => Some(3),
                AccX => Some(4),
                AccY => Some(5),
                AccZ => Some(6),
                MagX => Some(7),
                MagY => Some(8),
                MagZ => Some(9),
                GyroX | GyroY | GyroZ => None,
            },
            MotionLayout::QuatOnly => match metric {
                Q0 => Some(0),
                Q1 => Some(1),
                Q2 => Some(2),
                Q3 => Some(3),
                _ => None,
            },
        }
    }

    /// One-line reason used when a metric is unavailable in this layout.
    #[must_use]
    pub fn unavailable_reason(self, metric: MotionMetric) -> &'static str {
        use MotionMetric::*;
        match (self, metric) {
            (MotionLayout::GyroAccelMag, Q0 | Q1 | Q2 | Q3) => {
                "this headset reports gyroscope axes, not quaternions"
            }
            (MotionLayout::QuatAccelMag, GyroX | GyroY | GyroZ) => {
                "this headset reports quaternions, not gyroscope axes"
            }
            (MotionLayout::QuatOnly, _) => "this headset reports only quaternion data",
            _ => "metric not present in this headset's motion data",
        }
    }
}

/// A single motion metric a consumer can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionMetric {
    GyroX,
    GyroY,
    GyroZ,
    AccX,
    AccY,
    AccZ,
    MagX,
    MagY,
    MagZ,
    Q0,
    Q1,
    Q2,
    Q3,
}

/// Headset capabilities resolved once per session, consumed by the motion
/// decoder and stream constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadsetCapabilities {
    pub model: HeadsetModel,
    pub motion_layout: MotionLayout,
}

impl HeadsetCapabilities {
    /// Resolve capabilities from a headset ID.
    #[must_use]
    pub fn resolve(headset_id: &str) -> Self {
        let model = HeadsetModel::from_headset_id(headset_id);
        let motion_layout = model.motion_layout();
        Self {
            model,
            motion_layout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_from_headset_id() {
        assert_eq!(
            HeadsetModel::from_headset_id("INSIGHT-A1B2C3D4"),
            HeadsetModel::Insight
        );
        assert_eq!(
            HeadsetModel::from_headset_id("EPOCX-AABBCCDD"),
            HeadsetModel::EpocX
        );
        assert_eq!(
            HeadsetModel::from_headset_id("EPOC-X-AABBCCDD"),
            HeadsetModel::EpocX
        );
        assert_eq!(
            HeadsetModel::from_headset_id("EPOCPLUS-99887766"),
            HeadsetModel::EpocPlus
        );
        assert_eq!(
            HeadsetModel::from_headset_id("EPOCFLEX-11112222"),
            HeadsetModel::EpocFlex
        );
        assert_eq!(
            HeadsetModel::from_headset_id("MN8-55667788"),
            HeadsetModel::Mn8
        );
        assert_eq!(
            HeadsetModel::from_headset_id("mn8-55667788"),
            HeadsetModel::Mn8
        );
        assert!(matches!(
            HeadsetModel::from_headset_id("MYSTERY-0000"),
            HeadsetModel::Unknown(_)
        ));
    }

    #[test]
    fn test_motion_layout_per_model() {
        assert_eq!(
            HeadsetModel::EpocX.motion_layout(),
            MotionLayout::QuatAccelMag
        );
        assert_eq!(HeadsetModel::Mn8.motion_layout(), MotionLayout::QuatOnly);
        assert_eq!(
            HeadsetModel::Insight.motion_layout(),
            MotionLayout::GyroAccelMag
        );
        assert_eq!(
            HeadsetModel::EpocPlus.motion_layout(),
            MotionLayout::GyroAccelMag
        );
    }

    #[test]
    fn test_layout_index_tables() {
        use MotionMetric::*;

        let gyro = MotionLayout::GyroAccelMag;
        assert_eq!(gyro.index_of(GyroX), Some(0));
        assert_eq!(gyro.index_of(GyroZ), Some(2));
        assert_eq!(gyro.index_of(AccX), Some(3));
        assert_eq!(gyro.index_of(MagZ), Some(8));
        assert_eq!(gyro.index_of(Q0), None);

        let quat = MotionLayout::QuatAccelMag;
        assert_eq!(quat.index_of(Q0), Some(0));
        assert_eq!(quat.index_of(Q3), Some(3));
        assert_eq!(quat.index_of(AccX), Some(4));
        assert_eq!(quat.index_of(MagZ), Some(9));
        assert_eq!(quat.index_of(GyroY), None);

        let only = MotionLayout::QuatOnly;
        assert_eq!(only.index_of(Q2), Some(2));
        assert_eq!(only.index_of(AccX), None);
        assert_eq!(only.index_of(GyroX), None);
    }

    #[test]
    fn test_layout_from_sample_len() {
        assert_eq!(
            MotionLayout::from_sample_len(9),
            Some(MotionLayout::GyroAccelMag)
        );
        assert_eq!(
            MotionLayout::from_sample_len(10),
            Some(MotionLayout::QuatAccelMag)
        );
        assert_eq!(MotionLayout::from_sample_len(4), Some(MotionLayout::QuatOnly));
        assert_eq!(MotionLayout::from_sample_len(7), None);
    }

    #[test]
    fn test_capabilities_resolve() {
        let caps = HeadsetCapabilities::resolve("MN8-12345678");
        assert_eq!(caps.model, HeadsetModel::Mn8);
        assert_eq!(caps.motion_layout, MotionLayout::QuatOnly);
    }

    #[test]
    fn test_display() {
        assert_eq!(HeadsetModel::EpocX.to_string(), "EPOC X");
        assert_eq!(
            HeadsetModel::Unknown("XYZ-1".into()).to_string(),
            "Unknown (XYZ-1)"
        );
    }
}
