//! CLI errors and exit codes.
//!
//! Exit codes:
//! - 0: success
//! - 1: invalid invocation or unreadable input
//! - 2: the data or the store rejected the request

use opsreport_core::{LoggingError, PivotError, PriorityTableError};
use opsreport_store::{DbError, PublishError, StoreError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CliExitCode {
    Success = 0,
    Usage = 1,
    Rejected = 2,
}

impl From<CliExitCode> for ExitCode {
    fn from(code: CliExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Debug)]
pub enum CliError {
    Input { path: String, message: String },
    MissingSource,
    Logging(LoggingError),
    Table(PriorityTableError),
    Pivot(PivotError),
    Db(DbError),
    Store(StoreError),
    Publish(PublishError),
    Output(String),
}

impl CliError {
    pub fn exit_code(&self) -> CliExitCode {
        match self {
            Self::Input { .. } | Self::MissingSource | Self::Logging(_) | Self::Table(_) => {
                CliExitCode::Usage
            }
            Self::Pivot(PivotError::Configuration(_)) => CliExitCode::Usage,
            Self::Pivot(_) | Self::Db(_) | Self::Store(_) | Self::Publish(_) | Self::Output(_) => {
                CliExitCode::Rejected
            }
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input { path, message } => write!(f, "cannot read `{path}`: {message}"),
            Self::MissingSource => f.write_str("pass --input or --store to select observations"),
            Self::Logging(err) => write!(f, "{err}"),
            Self::Table(err) => write!(f, "priority table: {err}"),
            Self::Pivot(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "store database: {err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Publish(err) => write!(f, "publish failed: {err}"),
            Self::Output(message) => write!(f, "cannot write output: {message}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(err) => Some(err),
            Self::Table(err) => Some(err),
            Self::Pivot(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Publish(err) => Some(err),
            Self::Input { .. } | Self::MissingSource | Self::Output(_) => None,
        }
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<PriorityTableError> for CliError {
    fn from(value: PriorityTableError) -> Self {
        Self::Table(value)
    }
}

impl From<PivotError> for CliError {
    fn from(value: PivotError) -> Self {
        Self::Pivot(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<PublishError> for CliError {
    fn from(value: PublishError) -> Self {
        Self::Publish(value)
    }
}
