//! Pivot output model.
//!
//! # Responsibility
//! - Represent the dense (row-key, column-key) grid handed to renderers.
//! - Represent cells that merge a magnitude with its period-over-period change.
//!
//! # Invariants
//! - Every row has exactly one cell per column, `Total` included.
//! - `Total` is always the last column and there is never a total row.

use crate::model::dimension::{DimValue, Dimension};
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Display name of the synthetic per-row total column.
pub const TOTAL_COLUMN: &str = "Total";

/// Period-over-period ratio in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio {
    Finite(f64),
    /// Growth from a zero baseline.
    Infinite,
}

impl Ratio {
    pub fn direction(self) -> Direction {
        match self {
            Self::Infinite => Direction::Increase,
            Self::Finite(value) if value > 0.0 => Direction::Increase,
            Self::Finite(value) if value < 0.0 => Direction::Decrease,
            Self::Finite(_) => Direction::Unchanged,
        }
    }

    pub fn finite(self) -> Option<f64> {
        match self {
            Self::Finite(value) => Some(value),
            Self::Infinite => None,
        }
    }

    pub fn is_infinite(self) -> bool {
        matches!(self, Self::Infinite)
    }
}

impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Finite(value) => serializer.serialize_f64(*value),
            Self::Infinite => serializer.serialize_str("infinite"),
        }
    }
}

impl Display for Ratio {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Finite(value) => write!(f, "{value:+.1}%"),
            Self::Infinite => f.write_str("+inf%"),
        }
    }
}

/// Direction of change derived from a ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Increase,
    Decrease,
    Unchanged,
}

impl Direction {
    pub fn arrow(self) -> char {
        match self {
            Self::Increase => '↑',
            Self::Decrease => '↓',
            Self::Unchanged => '→',
        }
    }
}

/// Magnitude annotated with its aggregated change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedValue {
    pub magnitude: f64,
    pub ratio: Ratio,
    pub absolute_change: Option<f64>,
    pub direction: Direction,
}

impl AnnotatedValue {
    pub fn new(magnitude: f64, ratio: Ratio, absolute_change: Option<f64>) -> Self {
        Self {
            magnitude,
            ratio,
            absolute_change,
            direction: ratio.direction(),
        }
    }
}

/// One grid cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Value(f64),
    Annotated(AnnotatedValue),
}

impl Cell {
    /// Aggregated magnitude regardless of annotation.
    pub fn magnitude(&self) -> f64 {
        match self {
            Self::Value(value) => *value,
            Self::Annotated(annotated) => annotated.magnitude,
        }
    }

    pub fn annotation(&self) -> Option<&AnnotatedValue> {
        match self {
            Self::Value(_) => None,
            Self::Annotated(annotated) => Some(annotated),
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(value) => write_magnitude(f, *value),
            Self::Annotated(annotated) => {
                write_magnitude(f, annotated.magnitude)?;
                match annotated.ratio {
                    Ratio::Infinite => write!(f, " (↑∞%)"),
                    Ratio::Finite(value) => write!(
                        f,
                        " ({}{:.1}%)",
                        annotated.direction.arrow(),
                        value.abs()
                    ),
                }
            }
        }
    }
}

fn write_magnitude(f: &mut Formatter<'_>, value: f64) -> std::fmt::Result {
    if value.fract() == 0.0 {
        write!(f, "{value:.0}")
    } else {
        write!(f, "{value:.2}")
    }
}

/// Ordered tuple of dimension values identifying a row or a value column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct GridKey(pub Vec<DimValue>);

impl GridKey {
    pub fn values(&self) -> &[DimValue] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for GridKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, value) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(" / ")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

/// Column of a pivot grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    Values(GridKey),
    Total,
}

impl ColumnKey {
    pub fn is_total(&self) -> bool {
        matches!(self, Self::Total)
    }
}

impl Serialize for ColumnKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Total => serializer.serialize_str(TOTAL_COLUMN),
            Self::Values(key) => {
                let mut seq = serializer.serialize_seq(Some(key.0.len()))?;
                for value in &key.0 {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
        }
    }
}

impl Display for ColumnKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Total => f.write_str(TOTAL_COLUMN),
            Self::Values(key) => write!(f, "{key}"),
        }
    }
}

/// Dense pivot grid with per-row totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotResult {
    row_dims: Vec<Dimension>,
    col_dims: Vec<Dimension>,
    rows: Vec<GridKey>,
    columns: Vec<ColumnKey>,
    cells: Vec<Vec<Cell>>,
}

impl PivotResult {
    pub(crate) fn new(
        row_dims: Vec<Dimension>,
        col_dims: Vec<Dimension>,
        rows: Vec<GridKey>,
        columns: Vec<ColumnKey>,
        cells: Vec<Vec<Cell>>,
    ) -> Self {
        debug_assert_eq!(rows.len(), cells.len());
        debug_assert!(cells.iter().all(|row| row.len() == columns.len()));
        Self {
            row_dims,
            col_dims,
            rows,
            columns,
            cells,
        }
    }

    pub fn row_dims(&self) -> &[Dimension] {
        &self.row_dims
    }

    pub fn col_dims(&self) -> &[Dimension] {
        &self.col_dims
    }

    /// Row keys in display order.
    pub fn rows(&self) -> &[GridKey] {
        &self.rows
    }

    /// Column keys in display order, ending with `Total` unless empty.
    pub fn columns(&self) -> &[ColumnKey] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of the row at `index`, aligned with [`Self::columns`].
    pub fn row_cells(&self, index: usize) -> Option<&[Cell]> {
        self.cells.get(index).map(Vec::as_slice)
    }

    pub fn row_index(&self, row: &GridKey) -> Option<usize> {
        self.rows.iter().position(|candidate| candidate == row)
    }

    pub fn column_index(&self, column: &ColumnKey) -> Option<usize> {
        self.columns.iter().position(|candidate| candidate == column)
    }

    /// Looks up one cell by (row-key, column-key).
    pub fn cell(&self, row: &GridKey, column: &ColumnKey) -> Option<&Cell> {
        let row_index = self.row_index(row)?;
        let column_index = self.column_index(column)?;
        self.cells.get(row_index)?.get(column_index)
    }

    /// Total of one row.
    pub fn total(&self, row: &GridKey) -> Option<f64> {
        self.cell(row, &ColumnKey::Total).map(Cell::magnitude)
    }

    /// Position of a dimension inside the row key.
    pub fn row_dim_position(&self, dimension: Dimension) -> Option<usize> {
        self.row_dims.iter().position(|dim| *dim == dimension)
    }
}
