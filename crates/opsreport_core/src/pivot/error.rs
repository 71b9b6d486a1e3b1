//! Pivot build errors.

use crate::model::dimension::Dimension;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BuildResult<T> = Result<T, PivotError>;

/// Invalid dimension selection, rejected before any computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Neither a row nor a column dimension was selected.
    NoDimensions,
    /// A dimension appears both in rows and in columns.
    OverlappingDimension(Dimension),
    /// A dimension appears twice on the same axis.
    RepeatedDimension(Dimension),
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDimensions => f.write_str("select at least one row or column dimension"),
            Self::OverlappingDimension(dim) => {
                write!(f, "dimension `{dim}` cannot be both a row and a column")
            }
            Self::RepeatedDimension(dim) => write!(f, "dimension `{dim}` is selected twice"),
        }
    }
}

impl Error for ConfigurationError {}

/// Pivot build failure. No partial result accompanies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PivotError {
    Configuration(ConfigurationError),
    /// The value field holds a non-numeric, non-null entry.
    DataType {
        category: String,
        content: String,
        raw: String,
    },
}

impl Display for PivotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(err) => write!(f, "invalid pivot configuration: {err}"),
            Self::DataType {
                category,
                content,
                raw,
            } => write!(
                f,
                "non-numeric value `{raw}` in group ({category}, {content})"
            ),
        }
    }
}

impl Error for PivotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Configuration(err) => Some(err),
            Self::DataType { .. } => None,
        }
    }
}

impl From<ConfigurationError> for PivotError {
    fn from(value: ConfigurationError) -> Self {
        Self::Configuration(value)
    }
}
