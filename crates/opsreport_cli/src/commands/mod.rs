//! Command handlers and their shared input helpers.

pub mod info;
pub mod pivot;
pub mod publish;

use crate::error::CliError;
use opsreport_core::{Observation, PriorityTable};
use std::io::Write;
use std::path::Path;

/// Reads a JSON array of observations.
pub fn read_observations(path: &Path) -> Result<Vec<Observation>, CliError> {
    let input_error = |message: String| CliError::Input {
        path: path.display().to_string(),
        message,
    };
    let bytes = std::fs::read(path).map_err(|err| input_error(err.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|err| input_error(err.to_string()))
}

/// Priority table from `path`, or the built-in one.
pub enum TableSource {
    Builtin(&'static PriorityTable),
    Loaded(PriorityTable),
}

impl TableSource {
    pub fn open(path: Option<&Path>) -> Result<Self, CliError> {
        match path {
            Some(path) => Ok(Self::Loaded(PriorityTable::from_path(path)?)),
            None => Ok(Self::Builtin(PriorityTable::builtin())),
        }
    }

    pub fn table(&self) -> &PriorityTable {
        match self {
            Self::Builtin(table) => *table,
            Self::Loaded(table) => table,
        }
    }
}

pub fn write_stdout(text: &str) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|err| CliError::Output(err.to_string()))
}

pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map(|mut json| {
            json.push('\n');
            json
        })
        .map_err(|err| CliError::Output(err.to_string()))
}
