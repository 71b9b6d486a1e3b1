//! Pivot dimensions and dimension values.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Axis an observation can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dimension {
    Week,
    Month,
    Quarter,
    Year,
    Category,
    Content,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Week,
        Dimension::Month,
        Dimension::Quarter,
        Dimension::Year,
        Dimension::Category,
        Dimension::Content,
    ];

    /// Whether this dimension is a time unit.
    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            Self::Week | Self::Month | Self::Quarter | Self::Year
        )
    }

    /// Position of a temporal dimension from coarsest to finest.
    ///
    /// Returns `None` for taxonomy dimensions.
    pub fn chronological_rank(self) -> Option<u8> {
        match self {
            Self::Year => Some(0),
            Self::Quarter => Some(1),
            Self::Month => Some(2),
            Self::Week => Some(3),
            Self::Category | Self::Content => None,
        }
    }

    /// External column name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Week => "Week",
            Self::Month => "Month",
            Self::Quarter => "Quarter",
            Self::Year => "Year",
            Self::Category => "Category",
            Self::Content => "Content",
        }
    }
}

impl Display for Dimension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown dimension name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDimension(pub String);

impl Display for UnknownDimension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown dimension `{}`; expected week|month|quarter|year|category|content",
            self.0
        )
    }
}

impl Error for UnknownDimension {}

impl FromStr for Dimension {
    type Err = UnknownDimension;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            "year" => Ok(Self::Year),
            "category" => Ok(Self::Category),
            "content" => Ok(Self::Content),
            other => Err(UnknownDimension(other.to_string())),
        }
    }
}

/// Value of one observation projected on one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum DimValue {
    /// Week, month, quarter or year number.
    Int(i64),
    /// Category or content label.
    Label(String),
}

impl DimValue {
    pub fn as_label(&self) -> Option<&str> {
        match self {
            Self::Label(label) => Some(label.as_str()),
            Self::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Label(_) => None,
        }
    }
}

impl Display for DimValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Label(label) => f.write_str(label),
        }
    }
}
