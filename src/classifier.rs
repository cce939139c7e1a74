// 🎨 Classifier - intensity score → visual bucket
//
// First match wins, lower bounds inclusive:
//
//   ≥ 80 → highest
//   ≥ 60 → very-high
//   ≥ 40 → high
//   ≥ 20 → medium
//   else → low
//
// No resolvable intensity is its own bucket, `no-data`, which must not
// render like `low`.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntensityBucket {
    Highest,
    VeryHigh,
    High,
    Medium,
    Low,
    NoData,
}

/// Ordered ladder; evaluated top-down
const LADDER: [(f64, IntensityBucket); 4] = [
    (80.0, IntensityBucket::Highest),
    (60.0, IntensityBucket::VeryHigh),
    (40.0, IntensityBucket::High),
    (20.0, IntensityBucket::Medium),
];

impl IntensityBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntensityBucket::Highest => "highest",
            IntensityBucket::VeryHigh => "very-high",
            IntensityBucket::High => "high",
            IntensityBucket::Medium => "medium",
            IntensityBucket::Low => "low",
            IntensityBucket::NoData => "no-data",
        }
    }

    /// Fill color (hex). Data buckets use a green ramp; no-data is grey.
    pub fn color(&self) -> &'static str {
        match self {
            IntensityBucket::Highest => "#1b5e20",
            IntensityBucket::VeryHigh => "#2e7d32",
            IntensityBucket::High => "#43a047",
            IntensityBucket::Medium => "#81c784",
            IntensityBucket::Low => "#c8e6c9",
            IntensityBucket::NoData => "#d6d6d6",
        }
    }

    pub fn has_data(&self) -> bool {
        *self != IntensityBucket::NoData
    }
}

impl fmt::Display for IntensityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bucket for an intensity; `None` or NaN means nothing was resolvable.
pub fn classify(intensity: Option<f64>) -> IntensityBucket {
    let value = match intensity {
        Some(value) if !value.is_nan() => value,
        _ => return IntensityBucket::NoData,
    };

    LADDER
        .iter()
        .find(|(lower_bound, _)| value >= *lower_bound)
        .map(|(_, bucket)| *bucket)
        .unwrap_or(IntensityBucket::Low)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highest_boundary() {
        assert_eq!(classify(Some(81.0)), IntensityBucket::Highest);
        assert_eq!(classify(Some(80.0)), IntensityBucket::Highest);
        assert_eq!(classify(Some(100.0)), IntensityBucket::Highest);
    }

    #[test]
    fn test_each_boundary_is_inclusive() {
        assert_eq!(classify(Some(79.0)), IntensityBucket::VeryHigh);
        assert_eq!(classify(Some(79.999)), IntensityBucket::VeryHigh);
        assert_eq!(classify(Some(60.0)), IntensityBucket::VeryHigh);
        assert_eq!(classify(Some(59.999)), IntensityBucket::High);
        assert_eq!(classify(Some(40.0)), IntensityBucket::High);
        assert_eq!(classify(Some(39.999)), IntensityBucket::Medium);
        assert_eq!(classify(Some(20.0)), IntensityBucket::Medium);
        assert_eq!(classify(Some(19.999)), IntensityBucket::Low);
        assert_eq!(classify(Some(0.0)), IntensityBucket::Low);
    }

    #[test]
    fn test_no_data_is_distinct_from_low() {
        assert_eq!(classify(None), IntensityBucket::NoData);
        assert_eq!(classify(Some(f64::NAN)), IntensityBucket::NoData);
        assert_ne!(IntensityBucket::NoData.color(), IntensityBucket::Low.color());
        assert!(!IntensityBucket::NoData.has_data());
    }

    #[test]
    fn test_out_of_range_values_still_classify() {
        assert_eq!(classify(Some(-5.0)), IntensityBucket::Low);
        assert_eq!(classify(Some(250.0)), IntensityBucket::Highest);
    }

    #[test]
    fn test_bucket_names() {
        assert_eq!(IntensityBucket::VeryHigh.to_string(), "very-high");
        assert_eq!(
            serde_json::to_string(&IntensityBucket::NoData).unwrap(),
            "\"no-data\""
        );
    }
}
