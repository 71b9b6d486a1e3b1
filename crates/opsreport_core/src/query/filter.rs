use crate::delta::calculator::AnnotatedObservation;
use crate::model::observation::Observation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Membership constraints applied before a pivot is built.
///
/// `None` leaves a field unconstrained; an empty set matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObservationFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<BTreeSet<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months: Option<BTreeSet<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weeks: Option<BTreeSet<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<BTreeSet<String>>,
}

impl ObservationFilter {
    pub fn with_years(mut self, years: impl IntoIterator<Item = i32>) -> Self {
        self.years = Some(years.into_iter().collect());
        self
    }

    pub fn with_months(mut self, months: impl IntoIterator<Item = u32>) -> Self {
        self.months = Some(months.into_iter().collect());
        self
    }

    pub fn with_weeks(mut self, weeks: impl IntoIterator<Item = u32>) -> Self {
        self.weeks = Some(weeks.into_iter().collect());
        self
    }

    pub fn with_categories<S: Into<String>>(
        mut self,
        categories: impl IntoIterator<Item = S>,
    ) -> Self {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    /// Whether no field is constrained.
    pub fn is_unconstrained(&self) -> bool {
        self.years.is_none()
            && self.months.is_none()
            && self.weeks.is_none()
            && self.categories.is_none()
    }

    pub fn matches(&self, observation: &Observation) -> bool {
        allows(&self.years, &observation.year)
            && allows(&self.months, &observation.month)
            && allows(&self.weeks, &observation.week)
            && allows(&self.categories, &observation.category)
    }

    /// Keeps matching observations in input order.
    pub fn apply(&self, observations: Vec<AnnotatedObservation>) -> Vec<AnnotatedObservation> {
        if self.is_unconstrained() {
            return observations;
        }
        observations
            .into_iter()
            .filter(|annotated| self.matches(&annotated.observation))
            .collect()
    }
}

fn allows<T: Ord>(set: &Option<BTreeSet<T>>, value: &T) -> bool {
    set.as_ref().map_or(true, |set| set.contains(value))
}

#[cfg(test)]
mod tests {
    use super::ObservationFilter;
    use crate::model::observation::Observation;

    fn observation(category: &str, year: i32, month: u32, week: u32) -> Observation {
        Observation::new(category, "Số lượng", year, month, week, Some(1.0))
    }

    #[test]
    fn unconstrained_filter_keeps_everything() {
        let filter = ObservationFilter::default();
        assert!(filter.is_unconstrained());
        assert!(filter.matches(&observation("Tổ xe", 2025, 3, 10)));
    }

    #[test]
    fn empty_set_matches_nothing() {
        let filter = ObservationFilter::default().with_weeks(Vec::new());
        assert!(!filter.matches(&observation("Tổ xe", 2025, 3, 10)));
    }

    #[test]
    fn fields_combine_conjunctively() {
        let filter = ObservationFilter::default()
            .with_years([2025])
            .with_categories(["Tổ xe"]);
        assert!(filter.matches(&observation("Tổ xe", 2025, 1, 1)));
        assert!(!filter.matches(&observation("Tổ xe", 2024, 1, 1)));
        assert!(!filter.matches(&observation("Lễ tân", 2025, 1, 1)));
    }
}
