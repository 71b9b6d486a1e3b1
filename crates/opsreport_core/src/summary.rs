//! Companion summaries shown next to a pivot.
//!
//! # Responsibility
//! - Per-category totals in priority order.
//! - Delta coverage diagnostics.
//! - Least-squares trend of a pivot row.

use crate::delta::calculator::AnnotatedObservation;
use crate::model::observation::Observation;
use crate::model::pivot::{Direction, GridKey, PivotResult};
use crate::pivot::error::{BuildResult, PivotError};
use crate::priority::table::PriorityTable;
use serde::Serialize;
use std::collections::HashMap;

/// Aggregate of one category over its non-null values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub sum: f64,
    /// `None` when every value of the category is null.
    pub mean: Option<f64>,
    pub count: usize,
}

/// Summarizes every category present in `observations`.
///
/// # Errors
/// - `PivotError::DataType` when a value is not numeric.
pub fn category_summary<'a>(
    observations: impl IntoIterator<Item = &'a Observation>,
    table: &PriorityTable,
) -> BuildResult<Vec<CategorySummary>> {
    summarize(observations, table, true)
}

/// Like [`category_summary`], but non-numeric values count as null.
pub fn category_summary_resolvable<'a>(
    observations: impl IntoIterator<Item = &'a Observation>,
    table: &PriorityTable,
) -> Vec<CategorySummary> {
    summarize(observations, table, false).unwrap_or_default()
}

fn summarize<'a>(
    observations: impl IntoIterator<Item = &'a Observation>,
    table: &PriorityTable,
    reject_text: bool,
) -> BuildResult<Vec<CategorySummary>> {
    let mut totals: HashMap<&'a str, (f64, usize)> = HashMap::new();
    for observation in observations {
        let value = match observation.numeric_value() {
            Ok(value) => value,
            Err(err) if reject_text => {
                return Err(PivotError::DataType {
                    category: observation.category.clone(),
                    content: observation.content.clone(),
                    raw: err.raw,
                })
            }
            Err(_) => None,
        };
        let entry = totals.entry(observation.category.as_str()).or_default();
        if let Some(value) = value {
            entry.0 += value;
            entry.1 += 1;
        }
    }

    let ordered = table.sorted_categories(totals.keys().copied());
    Ok(ordered
        .into_iter()
        .map(|category| {
            let (sum, count) = totals.get(category).copied().unwrap_or_default();
            CategorySummary {
                category: category.to_string(),
                sum,
                mean: (count > 0).then(|| sum / count as f64),
                count,
            }
        })
        .collect())
}

/// How many observations carry a period-over-period ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DeltaCoverage {
    pub total: usize,
    pub with_ratio: usize,
}

impl DeltaCoverage {
    pub fn without_ratio(&self) -> usize {
        self.total - self.with_ratio
    }
}

pub fn delta_coverage(observations: &[AnnotatedObservation]) -> DeltaCoverage {
    DeltaCoverage {
        total: observations.len(),
        with_ratio: observations
            .iter()
            .filter(|annotated| annotated.delta.ratio.is_some())
            .count(),
    }
}

/// Least-squares slope of a row's magnitudes across its value columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    pub slope: f64,
    pub direction: Direction,
}

/// Fits a line through the row's magnitude cells, `Total` excluded.
///
/// Returns `None` for unknown rows and rows with fewer than three points.
pub fn row_trend(pivot: &PivotResult, row: &GridKey) -> Option<Trend> {
    let index = pivot.row_index(row)?;
    let cells = pivot.row_cells(index)?;
    let points: Vec<f64> = pivot
        .columns()
        .iter()
        .zip(cells)
        .filter(|(column, _)| !column.is_total())
        .map(|(_, cell)| cell.magnitude())
        .collect();
    if points.len() <= 2 {
        return None;
    }

    let n = points.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = points.iter().sum::<f64>() / n;
    let (mut covariance, mut variance) = (0.0, 0.0);
    for (x, y) in points.iter().enumerate() {
        let dx = x as f64 - mean_x;
        covariance += dx * (y - mean_y);
        variance += dx * dx;
    }
    let slope = covariance / variance;

    let direction = if slope > 0.0 {
        Direction::Increase
    } else if slope < 0.0 {
        Direction::Decrease
    } else {
        Direction::Unchanged
    };
    Some(Trend { slope, direction })
}
