//! Report engine for operational dashboards.
//! Ranks labels, computes period-over-period change and builds pivot grids.

pub mod delta;
pub mod hierarchy;
pub mod logging;
pub mod model;
pub mod pivot;
pub mod priority;
pub mod query;
pub mod service;
pub mod summary;

pub use delta::branch::{delta_between, DeltaAnnotation, DeltaBranch};
pub use delta::calculator::{attach_deltas, compute_deltas, AnnotatedObservation, DeltaIndex};
pub use hierarchy::{group_by_category, CategoryGroup, GroupedPivot, GroupedRow, PivotView};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::dimension::{DimValue, Dimension, UnknownDimension};
pub use model::observation::{NonNumericValue, Observation, ObservationId, RawValue};
pub use model::pivot::{
    AnnotatedValue, Cell, ColumnKey, Direction, GridKey, PivotResult, Ratio, TOTAL_COLUMN,
};
pub use pivot::aggregate::{AggFn, ValueField};
pub use pivot::builder::{build, PivotBuilder, PivotQuery};
pub use pivot::error::{BuildResult, ConfigurationError, PivotError};
pub use priority::table::{
    normalize_label, PriorityEntry, PriorityTable, PriorityTableError, TableKind, SENTINEL_RANK,
};
pub use query::filter::ObservationFilter;
pub use query::preset::ReportPreset;
pub use query::ReportQuery;
pub use service::report_service::{Report, ReportService};
pub use summary::{
    category_summary, category_summary_resolvable, delta_coverage, row_trend, CategorySummary,
    DeltaCoverage, Trend,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
