//! Report use-case service.
//!
//! # Responsibility
//! - Run the delta → filter → pivot pipeline for one [`ReportQuery`].
//! - Bundle the pivot with its companion summaries.
//!
//! # Invariants
//! - Deltas are computed over the full observation set before filtering, so a
//!   change still refers to the preceding period when that period is filtered
//!   out of the view.
//! - Summaries describe the filtered observations only.

use crate::delta::calculator::attach_deltas;
use crate::hierarchy::{group_by_category, PivotView};
use crate::model::observation::Observation;
use crate::model::pivot::{GridKey, PivotResult};
use crate::pivot::aggregate::ValueField;
use crate::pivot::builder::PivotBuilder;
use crate::pivot::error::BuildResult;
use crate::priority::table::PriorityTable;
use crate::query::ReportQuery;
use crate::summary::{
    category_summary, category_summary_resolvable, delta_coverage, row_trend, CategorySummary,
    DeltaCoverage, Trend,
};
use serde::Serialize;

/// Output of one report run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub pivot: PivotResult,
    /// Coverage over the filtered observations.
    pub coverage: DeltaCoverage,
    pub categories: Vec<CategorySummary>,
}

impl Report {
    /// Category-grouped presentation of the pivot.
    pub fn view<'a>(&'a self, table: &PriorityTable) -> PivotView<'a> {
        group_by_category(&self.pivot, table)
    }

    pub fn trend(&self, row: &GridKey) -> Option<Trend> {
        row_trend(&self.pivot, row)
    }
}

/// Report facade bound to one priority table.
pub struct ReportService<'t> {
    table: &'t PriorityTable,
}

impl<'t> ReportService<'t> {
    pub fn new(table: &'t PriorityTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'t PriorityTable {
        self.table
    }

    /// Builds the report described by `query`.
    ///
    /// # Errors
    /// - `PivotError::Configuration` for invalid dimension selections.
    /// - `PivotError::DataType` when a selected value is not numeric.
    pub fn run(&self, observations: &[Observation], query: &ReportQuery) -> BuildResult<Report> {
        query.pivot.validate()?;

        let selected = query.filter.apply(attach_deltas(observations));
        let pivot = PivotBuilder::new(self.table).build(&selected, &query.pivot)?;
        let raw_values = selected.iter().map(|annotated| &annotated.observation);
        // Raw text only fails the report when the pivot aggregates raw values.
        let categories = match query.pivot.value_field {
            ValueField::Value => category_summary(raw_values, self.table)?,
            ValueField::AbsoluteChange => category_summary_resolvable(raw_values, self.table),
        };

        Ok(Report {
            pivot,
            coverage: delta_coverage(&selected),
            categories,
        })
    }
}
