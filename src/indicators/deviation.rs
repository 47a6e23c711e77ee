//! Deviation classification relative to the reference range.

use crate::indicators::Indicator;
use serde::{Deserialize, Serialize};

/// Where a value sits relative to its reference range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Deviation {
    /// Below the reference minimum
    Low,
    /// Within the reference range, bounds inclusive
    Normal,
    /// Above the reference maximum
    High,
    /// Value or a bound is missing
    Unknown,
}

impl Deviation {
    /// Whether the value lies outside its reference range.
    pub fn is_flagged(&self) -> bool {
        matches!(self, Deviation::Low | Deviation::High)
    }
}

/// Classify `value` against `[ref_min, ref_max]`.
///
/// # Examples
///
/// ```
/// use lab_oxide::indicators::{classify, Deviation};
///
/// assert_eq!(classify(Some(5.6), Some(3.9), Some(5.5)), Deviation::High);
/// assert_eq!(classify(Some(3.9), Some(3.9), Some(5.5)), Deviation::Normal);
/// assert_eq!(classify(Some(5.6), None, Some(5.5)), Deviation::Unknown);
/// ```
pub fn classify(value: Option<f64>, ref_min: Option<f64>, ref_max: Option<f64>) -> Deviation {
    match (value, ref_min, ref_max) {
        (Some(v), Some(min), Some(max)) => {
            if v < min {
                Deviation::Low
            } else if v > max {
                Deviation::High
            } else {
                Deviation::Normal
            }
        },
        _ => Deviation::Unknown,
    }
}

/// Indicators whose value lies outside the reference range, in order.
pub fn flagged(indicators: &[Indicator]) -> impl Iterator<Item = &Indicator> {
    indicators.iter().filter(|i| i.deviation.is_flagged())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::Candidate;

    #[test]
    fn test_classify_bounds_are_inclusive() {
        assert_eq!(classify(Some(5.5), Some(3.9), Some(5.5)), Deviation::Normal);
        assert_eq!(classify(Some(3.8), Some(3.9), Some(5.5)), Deviation::Low);
        assert_eq!(classify(Some(5.51), Some(3.9), Some(5.5)), Deviation::High);
    }

    #[test]
    fn test_classify_missing_operand() {
        assert_eq!(classify(None, Some(3.9), Some(5.5)), Deviation::Unknown);
        assert_eq!(classify(Some(4.0), Some(3.9), None), Deviation::Unknown);
        assert_eq!(classify(None, None, None), Deviation::Unknown);
    }

    #[test]
    fn test_flagged_keeps_order() {
        let indicators: Vec<Indicator> = vec![
            Candidate::new("Glucose").with_value(5.6).with_range(3.9, 5.5),
            Candidate::new("Cholesterol").with_value(190.0).with_range(0.0, 200.0),
            Candidate::new("Ferritin").with_value(8.0).with_range(10.0, 120.0),
            Candidate::new("CRP").with_value(3.0),
        ]
        .into_iter()
        .map(Indicator::from)
        .collect();

        let names: Vec<&str> = flagged(&indicators).map(|i| i.test_name.as_str()).collect();
        assert_eq!(names, vec!["Glucose", "Ferritin"]);
    }
}
