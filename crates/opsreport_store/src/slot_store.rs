//! Revisioned object slots and their SQLite implementation.
//!
//! # Responsibility
//! - Provide get/put/list/delete over named slots holding opaque bytes.
//! - Reject stale writes through revision checks.
//!
//! # Invariants
//! - Every successful write produces a fresh revision.
//! - `put` with `expected_revision = None` only creates; it never overwrites.
//! - Listings are ordered by slot name.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque version tag of one slot write.
pub type Revision = Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    NotFound(String),
    /// The slot's current revision differs from the expected one.
    Conflict {
        slot: String,
        expected: Option<Revision>,
        actual: Option<Revision>,
    },
    Db(DbError),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(slot) => write!(f, "slot not found: {slot}"),
            Self::Conflict {
                slot,
                expected,
                actual,
            } => write!(
                f,
                "revision conflict on `{slot}`: expected {}, found {}",
                describe_revision(*expected),
                describe_revision(*actual)
            ),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

fn describe_revision(revision: Option<Revision>) -> String {
    revision.map_or_else(|| "no object".to_string(), |rev| rev.to_string())
}

/// Full content of one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub slot: String,
    pub revision: Revision,
    pub bytes: Vec<u8>,
    pub updated_at_ms: i64,
}

/// Listing entry without content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotEntry {
    pub slot: String,
    pub revision: Revision,
    pub size_bytes: u64,
    pub updated_at_ms: i64,
}

/// Revisioned object storage used for snapshot publication.
pub trait SnapshotStore {
    fn get(&self, slot: &str) -> StoreResult<StoredObject>;
    /// Writes `bytes`; `expected_revision` must match the slot's current
    /// revision, or be `None` for a slot that does not exist yet.
    fn put(
        &self,
        slot: &str,
        bytes: &[u8],
        expected_revision: Option<Revision>,
    ) -> StoreResult<Revision>;
    /// Slots whose name starts with `prefix`, ordered by name.
    fn list(&self, prefix: &str) -> StoreResult<Vec<SlotEntry>>;
    fn delete(&self, slot: &str, revision: Revision) -> StoreResult<()>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for &S {
    fn get(&self, slot: &str) -> StoreResult<StoredObject> {
        (**self).get(slot)
    }

    fn put(
        &self,
        slot: &str,
        bytes: &[u8],
        expected_revision: Option<Revision>,
    ) -> StoreResult<Revision> {
        (**self).put(slot, bytes, expected_revision)
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<SlotEntry>> {
        (**self).list(prefix)
    }

    fn delete(&self, slot: &str, revision: Revision) -> StoreResult<()> {
        (**self).delete(slot, revision)
    }
}

/// SQLite-backed slot store.
pub struct SqliteSnapshotStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSnapshotStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn current_revision(&self, slot: &str) -> StoreResult<Option<Revision>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT revision FROM slots WHERE slot = ?1;",
                params![slot],
                |row| row.get(0),
            )
            .optional()?;
        raw.map(|value| parse_revision(&value)).transpose()
    }

    fn conflict(&self, slot: &str, expected: Option<Revision>) -> StoreError {
        match self.current_revision(slot) {
            Ok(actual) => StoreError::Conflict {
                slot: slot.to_string(),
                expected,
                actual,
            },
            Err(err) => err,
        }
    }
}

impl SnapshotStore for SqliteSnapshotStore<'_> {
    fn get(&self, slot: &str) -> StoreResult<StoredObject> {
        let row = self
            .conn
            .query_row(
                "SELECT slot, revision, bytes, updated_at FROM slots WHERE slot = ?1;",
                params![slot],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Vec<u8>>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((slot, revision, bytes, updated_at_ms)) = row else {
            return Err(StoreError::NotFound(slot.to_string()));
        };
        Ok(StoredObject {
            revision: parse_revision(&revision)?,
            slot,
            bytes,
            updated_at_ms,
        })
    }

    fn put(
        &self,
        slot: &str,
        bytes: &[u8],
        expected_revision: Option<Revision>,
    ) -> StoreResult<Revision> {
        if slot.trim().is_empty() {
            return Err(StoreError::InvalidData("slot name cannot be empty".into()));
        }

        let revision = Uuid::new_v4();
        let changed = match expected_revision {
            None => self.conn.execute(
                "INSERT OR IGNORE INTO slots (slot, revision, bytes, size_bytes)
                 VALUES (?1, ?2, ?3, ?4);",
                params![slot, revision.to_string(), bytes, bytes.len() as i64],
            )?,
            Some(expected) => self.conn.execute(
                "UPDATE slots
                 SET
                    revision = ?1,
                    bytes = ?2,
                    size_bytes = ?3,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE slot = ?4 AND revision = ?5;",
                params![
                    revision.to_string(),
                    bytes,
                    bytes.len() as i64,
                    slot,
                    expected.to_string()
                ],
            )?,
        };

        if changed == 0 {
            return Err(self.conflict(slot, expected_revision));
        }
        Ok(revision)
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<SlotEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT slot, revision, size_bytes, updated_at
             FROM slots
             WHERE substr(slot, 1, length(?1)) = ?1
             ORDER BY slot ASC;",
        )?;
        let mut rows = stmt.query(params![prefix])?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn delete(&self, slot: &str, revision: Revision) -> StoreResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM slots WHERE slot = ?1 AND revision = ?2;",
            params![slot, revision.to_string()],
        )?;
        if changed > 0 {
            return Ok(());
        }

        match self.current_revision(slot)? {
            None => Err(StoreError::NotFound(slot.to_string())),
            Some(actual) => Err(StoreError::Conflict {
                slot: slot.to_string(),
                expected: Some(revision),
                actual: Some(actual),
            }),
        }
    }
}

fn parse_entry_row(row: &Row<'_>) -> StoreResult<SlotEntry> {
    let slot: String = row.get(0)?;
    let revision: String = row.get(1)?;
    let size_bytes: i64 = row.get(2)?;
    let updated_at_ms: i64 = row.get(3)?;

    let size_bytes = u64::try_from(size_bytes)
        .map_err(|_| StoreError::InvalidData(format!("negative size for slot `{slot}`")))?;
    Ok(SlotEntry {
        revision: parse_revision(&revision)?,
        slot,
        size_bytes,
        updated_at_ms,
    })
}

fn parse_revision(value: &str) -> StoreResult<Revision> {
    Uuid::parse_str(value)
        .map_err(|err| StoreError::InvalidData(format!("invalid revision `{value}`: {err}")))
}

#[cfg(test)]
mod tests {
    use super::{SnapshotStore, SqliteSnapshotStore, StoreError};
    use crate::db::open_store_db_in_memory;

    #[test]
    fn create_only_put_refuses_existing_slot() {
        let conn = open_store_db_in_memory().unwrap();
        let store = SqliteSnapshotStore::new(&conn);

        let first = store.put("a.json", b"one", None).unwrap();
        let err = store.put("a.json", b"two", None).unwrap_err();

        match err {
            StoreError::Conflict {
                expected, actual, ..
            } => {
                assert_eq!(expected, None);
                assert_eq!(actual, Some(first));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn prefix_listing_does_not_treat_underscore_as_wildcard() {
        let conn = open_store_db_in_memory().unwrap();
        let store = SqliteSnapshotStore::new(&conn);
        store.put("backup_1.json", b"x", None).unwrap();
        store.put("backupX1.json", b"y", None).unwrap();

        let slots: Vec<String> = store
            .list("backup_")
            .unwrap()
            .into_iter()
            .map(|entry| entry.slot)
            .collect();
        assert_eq!(slots, vec!["backup_1.json".to_string()]);
    }
}
