use crate::model::dimension::Dimension;
use crate::pivot::builder::PivotQuery;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Named report layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPreset {
    #[default]
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    Custom,
}

impl ReportPreset {
    pub const ALL: [ReportPreset; 5] = [
        Self::Weekly,
        Self::Monthly,
        Self::Quarterly,
        Self::Yearly,
        Self::Custom,
    ];

    /// Period dimension spread across the columns.
    pub fn time_dimension(self) -> Dimension {
        match self {
            Self::Weekly => Dimension::Week,
            Self::Monthly | Self::Custom => Dimension::Month,
            Self::Quarterly => Dimension::Quarter,
            Self::Yearly => Dimension::Year,
        }
    }

    pub fn row_dims(self) -> Vec<Dimension> {
        match self {
            Self::Weekly => vec![Dimension::Category, Dimension::Content],
            _ => vec![Dimension::Category],
        }
    }

    /// Sum pivot with deltas enabled.
    pub fn default_query(self) -> PivotQuery {
        PivotQuery::new(self.row_dims(), vec![self.time_dimension()]).with_delta(true)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
            Self::Custom => "custom",
        }
    }
}

impl Display for ReportPreset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportPreset {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str() == normalized)
            .ok_or_else(|| {
                format!("unknown preset `{value}`; expected weekly|monthly|quarterly|yearly|custom")
            })
    }
}
