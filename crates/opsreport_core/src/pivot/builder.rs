//! Pivot builder: dense grid, row totals, magnitude/delta merge.
//!
//! # Responsibility
//! - Validate the dimension selection before touching data.
//! - Join the magnitude grid with the delta grid by (row-key, column-key).
//! - Order rows and columns for display.
//!
//! # Invariants
//! - `Total` sums magnitude cells only and is computed before the merge.
//! - A failed build returns no partial result.
//! - Identical inputs produce identical results, ordering included.

use crate::delta::calculator::AnnotatedObservation;
use crate::model::dimension::Dimension;
use crate::model::pivot::{AnnotatedValue, Cell, ColumnKey, GridKey, PivotResult};
use crate::pivot::aggregate::{
    aggregate_deltas, aggregate_magnitudes, AggFn, DeltaGrid, MagnitudeGrid, ValueField,
};
use crate::pivot::error::{BuildResult, ConfigurationError};
use crate::pivot::ordering::KeyOrdering;
use crate::priority::table::PriorityTable;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Shape of one pivot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotQuery {
    pub row_dims: Vec<Dimension>,
    pub col_dims: Vec<Dimension>,
    #[serde(default)]
    pub value_field: ValueField,
    #[serde(default)]
    pub agg_fn: AggFn,
    #[serde(default)]
    pub include_delta: bool,
}

impl PivotQuery {
    pub fn new(row_dims: Vec<Dimension>, col_dims: Vec<Dimension>) -> Self {
        Self {
            row_dims,
            col_dims,
            value_field: ValueField::Value,
            agg_fn: AggFn::Sum,
            include_delta: false,
        }
    }

    pub fn with_agg(mut self, agg_fn: AggFn) -> Self {
        self.agg_fn = agg_fn;
        self
    }

    pub fn with_value_field(mut self, value_field: ValueField) -> Self {
        self.value_field = value_field;
        self
    }

    pub fn with_delta(mut self, include_delta: bool) -> Self {
        self.include_delta = include_delta;
        self
    }

    /// Checks that the dimension lists are non-empty overall and disjoint.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.row_dims.is_empty() && self.col_dims.is_empty() {
            return Err(ConfigurationError::NoDimensions);
        }

        for dims in [&self.row_dims, &self.col_dims] {
            let mut seen = HashSet::new();
            for dim in dims {
                if !seen.insert(*dim) {
                    return Err(ConfigurationError::RepeatedDimension(*dim));
                }
            }
        }

        if let Some(dim) = self.row_dims.iter().find(|dim| self.col_dims.contains(*dim)) {
            return Err(ConfigurationError::OverlappingDimension(*dim));
        }
        Ok(())
    }
}

/// Builds pivots using one priority table for display order.
pub struct PivotBuilder<'t> {
    table: &'t PriorityTable,
}

impl<'t> PivotBuilder<'t> {
    pub fn new(table: &'t PriorityTable) -> Self {
        Self { table }
    }

    /// Builds the dense pivot for `observations`.
    ///
    /// # Errors
    /// - `PivotError::Configuration` when the query is invalid.
    /// - `PivotError::DataType` when an aggregated value is not numeric.
    pub fn build(
        &self,
        observations: &[AnnotatedObservation],
        query: &PivotQuery,
    ) -> BuildResult<PivotResult> {
        query.validate()?;

        let magnitudes = aggregate_magnitudes(
            observations,
            &query.row_dims,
            &query.col_dims,
            query.value_field,
            query.agg_fn,
        )?;
        if magnitudes.is_empty() {
            return Ok(PivotResult::new(
                query.row_dims.clone(),
                query.col_dims.clone(),
                Vec::new(),
                Vec::new(),
                Vec::new(),
            ));
        }

        let deltas = query
            .include_delta
            .then(|| aggregate_deltas(observations, &query.row_dims, &query.col_dims));

        let mut rows = magnitudes.rows().to_vec();
        KeyOrdering::new(self.table, &query.row_dims).sort(&mut rows);
        let mut value_columns = magnitudes.columns().to_vec();
        KeyOrdering::new(self.table, &query.col_dims).sort(&mut value_columns);

        let cells = rows
            .iter()
            .map(|row| merge_row(row, &value_columns, &magnitudes, deltas.as_ref()))
            .collect();

        let mut columns: Vec<ColumnKey> = value_columns.into_iter().map(ColumnKey::Values).collect();
        columns.push(ColumnKey::Total);

        Ok(PivotResult::new(
            query.row_dims.clone(),
            query.col_dims.clone(),
            rows,
            columns,
            cells,
        ))
    }
}

/// Builds one pivot with [`PivotBuilder`].
pub fn build(
    observations: &[AnnotatedObservation],
    query: &PivotQuery,
    table: &PriorityTable,
) -> BuildResult<PivotResult> {
    PivotBuilder::new(table).build(observations, query)
}

fn merge_row(
    row: &GridKey,
    columns: &[GridKey],
    magnitudes: &MagnitudeGrid,
    deltas: Option<&DeltaGrid>,
) -> Vec<Cell> {
    let mut total = 0.0;
    let mut cells: Vec<Cell> = columns
        .iter()
        .map(|column| {
            let magnitude = magnitudes.get(row, column);
            total += magnitude;
            match deltas.and_then(|grid| grid.get(row, column)) {
                Some(delta) => Cell::Annotated(AnnotatedValue::new(
                    magnitude,
                    delta.ratio,
                    delta.absolute_change,
                )),
                None => Cell::Value(magnitude),
            }
        })
        .collect();
    cells.push(Cell::Value(total));
    cells
}
