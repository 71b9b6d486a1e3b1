//! Report queries: pivot shape plus observation filters.
//!
//! # Responsibility
//! - Describe which observations enter a report and how they are laid out.
//! - Provide the named layouts offered by the dashboard.

pub mod filter;
pub mod preset;

use crate::pivot::builder::PivotQuery;
use filter::ObservationFilter;
use preset::ReportPreset;
use serde::{Deserialize, Serialize};

/// Full description of one report run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportQuery {
    pub pivot: PivotQuery,
    #[serde(default)]
    pub filter: ObservationFilter,
}

impl ReportQuery {
    pub fn new(pivot: PivotQuery) -> Self {
        Self {
            pivot,
            filter: ObservationFilter::default(),
        }
    }

    pub fn from_preset(preset: ReportPreset) -> Self {
        Self::new(preset.default_query())
    }

    pub fn with_filter(mut self, filter: ObservationFilter) -> Self {
        self.filter = filter;
        self
    }
}
