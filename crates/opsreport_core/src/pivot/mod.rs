//! Aggregation engine (pivot builder).
//!
//! # Responsibility
//! - Cross-tabulate observations over configurable row/column dimensions.
//! - Merge aggregated magnitudes with aggregated period-over-period change.
//!
//! # Invariants
//! - Magnitude grids are zero-filled; delta grids are null-filled.
//! - Only per-row totals are produced, never a grand total.

pub mod aggregate;
pub mod builder;
pub mod error;
pub mod ordering;
