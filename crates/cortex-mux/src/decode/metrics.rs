//! Performance metric decoder.
//!
//! The `met` vector mixes booleans (per-metric "active" flags) with
//! numbers, so metric positions are fixed indices into a `Value` slice
//! rather than offsets into an all-float vector.

use serde_json::Value;

use super::rescale;

/// Performance metrics and their fixed positions in the `met` vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PerformanceMetric {
    Engagement,
    Excitement,
    LongTermExcitement,
    Stress,
    Relaxation,
    Interest,
    Focus,
}

impl PerformanceMetric {
    /// Index of the metric's numeric value in the `met` vector. Each
    /// metric's boolean "active" flag precedes its value, which is why
    /// the numeric slots are odd (long-term excitement rides along
    /// with excitement's flag).
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            PerformanceMetric::Engagement => 1,
            PerformanceMetric::Excitement => 3,
            PerformanceMetric::LongTermExcitement => 4,
            PerformanceMetric::Stress => 6,
            PerformanceMetric::Relaxation => 8,
            PerformanceMetric::Interest => 10,
            PerformanceMetric::Focus => 12,
        }
    }
}

/// Decode one metric from the mixed-type `met` vector, rescaled to
/// 0..=100. Returns `None` when the slot is missing or non-numeric
/// (detection inactive).
#[must_use]
pub fn decode_metric(met: &[Value], metric: PerformanceMetric) -> Option<u32> {
    met.get(metric.index())
        .and_then(Value::as_f64)
        .map(rescale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Vec<Value> {
        // [eng.isActive, eng, exc.isActive, exc, lex, str.isActive, str,
        //  rel.isActive, rel, int.isActive, int, foc.isActive, foc]
        vec![
            json!(true),
            json!(0.5),
            json!(true),
            json!(0.8),
            json!(0.31),
            json!(true),
            json!(0.25),
            json!(true),
            json!(0.9),
            json!(true),
            json!(0.42),
            json!(true),
            json!(0.7),
        ]
    }

    #[test]
    fn test_fixed_indices() {
        let met = sample();
        assert_eq!(decode_metric(&met, PerformanceMetric::Engagement), Some(50));
        assert_eq!(decode_metric(&met, PerformanceMetric::Excitement), Some(80));
        assert_eq!(
            decode_metric(&met, PerformanceMetric::LongTermExcitement),
            Some(31)
        );
        assert_eq!(decode_metric(&met, PerformanceMetric::Stress), Some(25));
        assert_eq!(decode_metric(&met, PerformanceMetric::Relaxation), Some(90));
        assert_eq!(decode_metric(&met, PerformanceMetric::Interest), Some(42));
        assert_eq!(decode_metric(&met, PerformanceMetric::Focus), Some(70));
    }

    #[test]
    fn test_all_numeric_vector() {
        // Some Cortex builds send numbers in the flag slots too; the
        // fixed indices still pick the right values.
        let met: Vec<Value> = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 0.95, 0.99, 0.5, 0.6]
            .iter()
            .map(|v| json!(v))
            .collect();
        assert_eq!(decode_metric(&met, PerformanceMetric::Stress), Some(70));
        assert_eq!(decode_metric(&met, PerformanceMetric::Engagement), Some(20));
    }

    #[test]
    fn test_inactive_metric_is_none() {
        let mut met = sample();
        met[1] = Value::Null;
        assert_eq!(decode_metric(&met, PerformanceMetric::Engagement), None);
    }

    #[test]
    fn test_boolean_slot_is_none() {
        // Booleans are flags, never values.
        let met = sample();
        assert!(met[0].as_f64().is_none());
    }

    #[test]
    fn test_short_vector_is_none() {
        let met = vec![json!(true), json!(0.5)];
        assert_eq!(decode_metric(&met, PerformanceMetric::Focus), None);
    }
}
