//! Magnitude and delta aggregations over observed grid pairings.
//!
//! # Responsibility
//! - Reduce observations into per-(row-key, column-key) cells.
//! - Keep the zero-filled magnitude grid and the null-filled delta grid as
//!   two independent computations.
//!
//! # Invariants
//! - Key sets contain only observed combinations.
//! - Absent magnitude pairings read as `0`; absent delta pairings read as
//!   `None`.

use crate::delta::calculator::AnnotatedObservation;
use crate::model::dimension::Dimension;
use crate::model::pivot::{GridKey, Ratio};
use crate::pivot::error::{BuildResult, PivotError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

/// Reduction applied to the values of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggFn {
    #[default]
    Sum,
    Mean,
    Count,
    Min,
    Max,
}

impl FromStr for AggFn {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(Self::Sum),
            "mean" => Ok(Self::Mean),
            "count" => Ok(Self::Count),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            other => Err(format!(
                "unsupported aggregation `{other}`; expected sum|mean|count|min|max"
            )),
        }
    }
}

/// Numeric field aggregated into magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ValueField {
    /// Raw observed value.
    #[default]
    Value,
    /// Change relative to the preceding period.
    AbsoluteChange,
}

impl ValueField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Value => "Value",
            Self::AbsoluteChange => "AbsoluteChange",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    count: usize,
    min: Option<f64>,
    max: Option<f64>,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
        self.min = Some(self.min.map_or(value, |min| min.min(value)));
        self.max = Some(self.max.map_or(value, |max| max.max(value)));
    }

    fn finish(&self, agg_fn: AggFn) -> f64 {
        match agg_fn {
            AggFn::Sum => self.sum,
            AggFn::Count => self.count as f64,
            AggFn::Mean if self.count > 0 => self.sum / self.count as f64,
            AggFn::Min => self.min.unwrap_or(0.0),
            AggFn::Max => self.max.unwrap_or(0.0),
            AggFn::Mean => 0.0,
        }
    }
}

/// Projects an observation onto the given dimensions.
pub fn grid_key(observation: &AnnotatedObservation, dims: &[Dimension]) -> GridKey {
    GridKey(
        dims.iter()
            .map(|dim| observation.observation.dim_value(*dim))
            .collect(),
    )
}

/// Zero-filled magnitude grid.
#[derive(Debug, Clone, Default)]
pub struct MagnitudeGrid {
    rows: Vec<GridKey>,
    columns: Vec<GridKey>,
    cells: HashMap<(GridKey, GridKey), f64>,
}

impl MagnitudeGrid {
    /// Observed row keys in first-appearance order.
    pub fn rows(&self) -> &[GridKey] {
        &self.rows
    }

    /// Observed column keys in first-appearance order.
    pub fn columns(&self) -> &[GridKey] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Aggregated magnitude; `0` for pairings absent from the data.
    pub fn get(&self, row: &GridKey, column: &GridKey) -> f64 {
        self.cells
            .get(&(row.clone(), column.clone()))
            .copied()
            .unwrap_or(0.0)
    }

    /// Whether the pairing was observed at all.
    pub fn contains(&self, row: &GridKey, column: &GridKey) -> bool {
        self.cells.contains_key(&(row.clone(), column.clone()))
    }
}

/// Aggregates `value_field` with `agg_fn` over every observed pairing.
///
/// Null values are skipped. A pairing whose values are all null still
/// exists: `sum`/`count` give `0`, `mean`/`min`/`max` take the zero fill.
///
/// # Errors
/// - `PivotError::DataType` on the first non-numeric, non-null value.
pub fn aggregate_magnitudes(
    observations: &[AnnotatedObservation],
    row_dims: &[Dimension],
    col_dims: &[Dimension],
    value_field: ValueField,
    agg_fn: AggFn,
) -> BuildResult<MagnitudeGrid> {
    let mut grid = MagnitudeGrid::default();
    let mut accumulators: HashMap<(GridKey, GridKey), Accumulator> = HashMap::new();
    let mut seen_rows = HashSet::new();
    let mut seen_columns = HashSet::new();

    for annotated in observations {
        let value = field_value(annotated, value_field)?;
        let row = grid_key(annotated, row_dims);
        let column = grid_key(annotated, col_dims);

        if seen_rows.insert(row.clone()) {
            grid.rows.push(row.clone());
        }
        if seen_columns.insert(column.clone()) {
            grid.columns.push(column.clone());
        }

        let accumulator = accumulators.entry((row, column)).or_default();
        if let Some(value) = value {
            accumulator.push(value);
        }
    }

    grid.cells = accumulators
        .into_iter()
        .map(|(key, accumulator)| (key, accumulator.finish(agg_fn)))
        .collect();
    Ok(grid)
}

fn field_value(annotated: &AnnotatedObservation, field: ValueField) -> BuildResult<Option<f64>> {
    match field {
        ValueField::AbsoluteChange => Ok(annotated.delta.absolute_change),
        ValueField::Value => annotated.observation.numeric_value().map_err(|err| {
            PivotError::DataType {
                category: annotated.observation.category.clone(),
                content: annotated.observation.content.clone(),
                raw: err.raw,
            }
        }),
    }
}

/// Mean change of one observed pairing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaCell {
    pub ratio: Ratio,
    pub absolute_change: Option<f64>,
}

/// Null-filled delta grid.
#[derive(Debug, Clone, Default)]
pub struct DeltaGrid {
    cells: HashMap<(GridKey, GridKey), DeltaCell>,
}

impl DeltaGrid {
    /// Mean delta of a pairing; `None` when no contributing delta exists.
    pub fn get(&self, row: &GridKey, column: &GridKey) -> Option<&DeltaCell> {
        self.cells.get(&(row.clone(), column.clone()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[derive(Debug, Default)]
struct DeltaAccumulator {
    ratio_sum: f64,
    ratio_count: usize,
    infinite: bool,
    change_sum: f64,
    change_count: usize,
}

/// Averages ratios over pairings that carry at least one non-null ratio.
///
/// A pairing whose contributing ratios include the infinite marker averages
/// to the marker.
pub fn aggregate_deltas(
    observations: &[AnnotatedObservation],
    row_dims: &[Dimension],
    col_dims: &[Dimension],
) -> DeltaGrid {
    let mut accumulators: HashMap<(GridKey, GridKey), DeltaAccumulator> = HashMap::new();

    for annotated in observations {
        let Some(ratio) = annotated.delta.ratio else {
            continue;
        };
        let accumulator = accumulators
            .entry((grid_key(annotated, row_dims), grid_key(annotated, col_dims)))
            .or_default();

        match ratio {
            Ratio::Finite(value) => {
                accumulator.ratio_sum += value;
                accumulator.ratio_count += 1;
            }
            Ratio::Infinite => accumulator.infinite = true,
        }
        if let Some(change) = annotated.delta.absolute_change {
            accumulator.change_sum += change;
            accumulator.change_count += 1;
        }
    }

    let cells = accumulators
        .into_iter()
        .map(|(key, acc)| {
            let ratio = if acc.infinite {
                Ratio::Infinite
            } else {
                Ratio::Finite(acc.ratio_sum / acc.ratio_count as f64)
            };
            let absolute_change =
                (acc.change_count > 0).then(|| acc.change_sum / acc.change_count as f64);
            (
                key,
                DeltaCell {
                    ratio,
                    absolute_change,
                },
            )
        })
        .collect();

    DeltaGrid { cells }
}
