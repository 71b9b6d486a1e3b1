//! Slot table schema history.
//!
//! Scripts run in version order inside one transaction; the reached version
//! is stored in `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

struct SchemaStep {
    version: u32,
    name: &'static str,
    script: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "0001_init",
        script: include_str!("0001_init.sql"),
    },
    SchemaStep {
        version: 2,
        name: "0002_slot_size",
        script: include_str!("0002_slot_size.sql"),
    },
];

/// Schema version a fully migrated store reports.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Names of the steps a store at `version` still needs.
pub fn pending_steps(version: u32) -> Vec<&'static str> {
    SCHEMA_STEPS
        .iter()
        .filter(|step| step.version > version)
        .map(|step| step.name)
        .collect()
}

/// Runs every pending step and returns how many were applied.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the store is ahead of this build.
/// - `Migration` naming the first script that failed.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let found = schema_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::UnsupportedSchemaVersion { found, supported });
    }

    let pending: Vec<&SchemaStep> = SCHEMA_STEPS
        .iter()
        .filter(|step| step.version > found)
        .collect();
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for step in &pending {
        let versioned = format!("{}\nPRAGMA user_version = {};", step.script, step.version);
        tx.execute_batch(&versioned)
            .map_err(|source| DbError::Migration {
                name: step.name,
                source,
            })?;
    }
    tx.commit()?;
    Ok(pending.len())
}

pub(crate) fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::{latest_version, pending_steps};

    #[test]
    fn pending_steps_follow_the_current_version() {
        assert_eq!(pending_steps(0), vec!["0001_init", "0002_slot_size"]);
        assert_eq!(pending_steps(1), vec!["0002_slot_size"]);
        assert!(pending_steps(latest_version()).is_empty());
    }
}
