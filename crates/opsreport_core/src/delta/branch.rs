//! Branch table for one (previous, current) value pair.
//!
//! Every branch is classified first and evaluated second, so each one can be
//! exercised on its own.

use crate::model::pivot::Ratio;
use serde::Serialize;

/// Change of one observation relative to its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DeltaAnnotation {
    pub ratio: Option<Ratio>,
    pub absolute_change: Option<f64>,
}

impl DeltaAnnotation {
    /// Annotation with both fields null.
    pub const NONE: DeltaAnnotation = DeltaAnnotation {
        ratio: None,
        absolute_change: None,
    };

    pub fn is_none(&self) -> bool {
        self.ratio.is_none() && self.absolute_change.is_none()
    }
}

/// Which rule applies to a (previous, current) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaBranch {
    /// First observation of its group.
    NoPredecessor,
    /// Previous or current value is null.
    MissingValue,
    /// Nonzero previous value of either sign.
    Proportional,
    /// Previous value is zero and current is positive.
    GrowthFromZero,
    /// Previous value is zero and current is zero or negative.
    Unresolved,
}

impl DeltaBranch {
    /// Classifies a pair; `previous = None` means there is no predecessor.
    pub fn classify(previous: Option<Option<f64>>, current: Option<f64>) -> Self {
        match (previous, current) {
            (None, _) => Self::NoPredecessor,
            (Some(None), _) | (Some(Some(_)), None) => Self::MissingValue,
            (Some(Some(prev)), Some(_)) if prev != 0.0 => Self::Proportional,
            (Some(Some(_)), Some(cur)) if cur > 0.0 => Self::GrowthFromZero,
            (Some(Some(_)), Some(_)) => Self::Unresolved,
        }
    }

    /// Evaluates this branch for the given pair.
    pub fn annotate(self, previous: Option<f64>, current: Option<f64>) -> DeltaAnnotation {
        match (self, previous, current) {
            (Self::Proportional, Some(prev), Some(cur)) => DeltaAnnotation {
                ratio: Some(Ratio::Finite((cur - prev) / prev * 100.0)),
                absolute_change: Some(cur - prev),
            },
            (Self::GrowthFromZero, _, Some(cur)) => DeltaAnnotation {
                ratio: Some(Ratio::Infinite),
                absolute_change: Some(cur),
            },
            _ => DeltaAnnotation::NONE,
        }
    }
}

/// Delta of `current` relative to `previous` (`None` = no predecessor).
pub fn delta_between(previous: Option<Option<f64>>, current: Option<f64>) -> DeltaAnnotation {
    DeltaBranch::classify(previous, current).annotate(previous.flatten(), current)
}

#[cfg(test)]
mod tests {
    use super::{delta_between, DeltaAnnotation, DeltaBranch};
    use crate::model::pivot::Ratio;

    #[test]
    fn classify_covers_every_branch() {
        assert_eq!(DeltaBranch::classify(None, Some(1.0)), DeltaBranch::NoPredecessor);
        assert_eq!(DeltaBranch::classify(Some(None), Some(1.0)), DeltaBranch::MissingValue);
        assert_eq!(DeltaBranch::classify(Some(Some(1.0)), None), DeltaBranch::MissingValue);
        assert_eq!(DeltaBranch::classify(Some(Some(-10.0)), Some(5.0)), DeltaBranch::Proportional);
        assert_eq!(DeltaBranch::classify(Some(Some(0.0)), Some(5.0)), DeltaBranch::GrowthFromZero);
        assert_eq!(DeltaBranch::classify(Some(Some(0.0)), Some(0.0)), DeltaBranch::Unresolved);
        assert_eq!(DeltaBranch::classify(Some(Some(0.0)), Some(-3.0)), DeltaBranch::Unresolved);
    }

    #[test]
    fn growth_from_zero_uses_marker() {
        let delta = delta_between(Some(Some(0.0)), Some(5.0));
        assert_eq!(delta.ratio, Some(Ratio::Infinite));
        assert_eq!(delta.absolute_change, Some(5.0));
    }

    #[test]
    fn negative_baseline_uses_general_formula() {
        let delta = delta_between(Some(Some(-10.0)), Some(5.0));
        assert_eq!(delta.ratio, Some(Ratio::Finite(-150.0)));
        assert_eq!(delta.absolute_change, Some(15.0));
    }

    #[test]
    fn zero_to_zero_stays_null() {
        assert_eq!(delta_between(Some(Some(0.0)), Some(0.0)), DeltaAnnotation::NONE);
    }
}
