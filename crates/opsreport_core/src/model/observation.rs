//! Observation record model.
//!
//! # Responsibility
//! - Represent one normalized input row (`Category, Content, Week, Month,
//!   Year, Value`).
//! - Resolve raw values into numbers with explicit null/non-numeric states.
//!
//! # Invariants
//! - `id` is unique within one observation set.
//! - `month` is in `1..=12` for loaded rows; out-of-range months are rejected
//!   at deserialization and quarter is derived from it.

use crate::model::dimension::{DimValue, Dimension};
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identity of one observation inside an observation set.
pub type ObservationId = Uuid;

/// Raw cell content of the `Value` column.
///
/// Loading layers may hand over spreadsheet text; the engine decides whether
/// it is numeric at aggregation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

/// Raised when a value cell holds text that is not a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonNumericValue {
    pub raw: String,
}

impl Display for NonNumericValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "value `{}` is not numeric", self.raw)
    }
}

impl Error for NonNumericValue {}

impl RawValue {
    /// Resolves this cell into a number.
    ///
    /// - Finite numbers and numeric text map to `Some(number)`.
    /// - NaN/infinite numbers and blank text are treated as null.
    /// - Any other text is rejected.
    pub fn resolve(&self) -> Result<Option<f64>, NonNumericValue> {
        match self {
            Self::Number(value) if value.is_finite() => Ok(Some(*value)),
            Self::Number(_) => Ok(None),
            Self::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                match trimmed.parse::<f64>() {
                    Ok(value) if value.is_finite() => Ok(Some(value)),
                    _ => Err(NonNumericValue { raw: text.clone() }),
                }
            }
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// One periodic measurement tagged by (category, content).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(default = "Uuid::new_v4")]
    pub id: ObservationId,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Content")]
    pub content: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month", deserialize_with = "deserialize_month")]
    pub month: u32,
    #[serde(rename = "Week")]
    pub week: u32,
    #[serde(rename = "Value", default)]
    pub value: Option<RawValue>,
}

impl Observation {
    /// Creates an observation with a generated identity and numeric value.
    pub fn new(
        category: impl Into<String>,
        content: impl Into<String>,
        year: i32,
        month: u32,
        week: u32,
        value: Option<f64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: category.into(),
            content: content.into(),
            year,
            month,
            week,
            value: value.map(RawValue::Number),
        }
    }

    /// Replaces the raw value cell, e.g. with untyped spreadsheet text.
    pub fn with_raw_value(mut self, value: Option<RawValue>) -> Self {
        self.value = value;
        self
    }

    /// Quarter derived as `((month - 1) / 3) + 1`, always in `1..=4`.
    pub fn quarter(&self) -> u32 {
        (self.month.clamp(1, 12) - 1) / 3 + 1
    }

    /// Numeric value; `Ok(None)` for null cells.
    pub fn numeric_value(&self) -> Result<Option<f64>, NonNumericValue> {
        match &self.value {
            Some(raw) => raw.resolve(),
            None => Ok(None),
        }
    }

    /// Chronological position inside a (category, content) group.
    pub fn period(&self) -> (i32, u32, u32) {
        (self.year, self.month, self.week)
    }

    /// Projects this observation onto one pivot dimension.
    pub fn dim_value(&self, dimension: Dimension) -> DimValue {
        match dimension {
            Dimension::Week => DimValue::Int(i64::from(self.week)),
            Dimension::Month => DimValue::Int(i64::from(self.month)),
            Dimension::Quarter => DimValue::Int(i64::from(self.quarter())),
            Dimension::Year => DimValue::Int(i64::from(self.year)),
            Dimension::Category => DimValue::Label(self.category.clone()),
            Dimension::Content => DimValue::Label(self.content.clone()),
        }
    }
}

fn deserialize_month<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let month = u32::deserialize(deserializer)?;
    if (1..=12).contains(&month) {
        Ok(month)
    } else {
        Err(<D::Error as serde::de::Error>::custom(format!(
            "month {month} is outside 1..=12"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::{Observation, RawValue};

    #[test]
    fn out_of_range_months_are_rejected_on_load() {
        let row = |month: u32| {
            format!(
                r#"{{"Category":"A","Content":"X","Year":2025,"Month":{month},"Week":1,"Value":1}}"#
            )
        };
        assert!(serde_json::from_str::<Observation>(&row(0)).is_err());
        assert!(serde_json::from_str::<Observation>(&row(13)).is_err());
        let december: Observation = serde_json::from_str(&row(12)).unwrap();
        assert_eq!(december.quarter(), 4);
    }

    #[test]
    fn quarter_is_derived_from_month() {
        let quarters: Vec<u32> = (1..=12)
            .map(|month| Observation::new("A", "X", 2025, month, 1, None).quarter())
            .collect();
        assert_eq!(quarters, vec![1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4]);
    }

    #[test]
    fn raw_text_resolution_accepts_numbers_and_blanks() {
        assert_eq!(RawValue::Text(" 12.5 ".into()).resolve(), Ok(Some(12.5)));
        assert_eq!(RawValue::Text("   ".into()).resolve(), Ok(None));
        assert_eq!(RawValue::Number(f64::NAN).resolve(), Ok(None));
        assert!(RawValue::Text("n/a".into()).resolve().is_err());
    }
}
