//! Snapshot publication with backup rotation.
//!
//! # Responsibility
//! - Replace the current snapshot while keeping the previous one as a backup.
//! - Record upload metadata next to the snapshot.
//! - Trim backups beyond the retention limit.
//!
//! # Invariants
//! - An oversized snapshot is rejected before any slot is touched.
//! - The current slot is only written with the revision that was read, so a
//!   concurrent publisher surfaces as `StoreError::Conflict`.
//! - Cleanup failures are logged and never fail a completed publish.

use crate::config::StoreConfig;
use crate::package::{SnapshotMetadata, SnapshotPackage};
use crate::slot_store::{Revision, SnapshotStore, StoreError, StoreResult, StoredObject};
use log::{error, info, warn};
use opsreport_core::Observation;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

#[derive(Debug)]
pub enum PublishError {
    TooLarge { size_bytes: u64, limit: u64 },
    Store(StoreError),
}

impl Display for PublishError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooLarge { size_bytes, limit } => write!(
                f,
                "snapshot is {size_bytes} bytes; the limit is {limit} bytes"
            ),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PublishError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::TooLarge { .. } => None,
        }
    }
}

impl From<StoreError> for PublishError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Outcome of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishReceipt {
    pub revision: Revision,
    pub metadata: SnapshotMetadata,
    /// Backup slots deleted by retention.
    pub removed_backups: Vec<String>,
}

/// Slot usage summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StorageInfo {
    pub total_slots: usize,
    pub backup_slots: usize,
    pub total_bytes: u64,
}

/// Publishes observation snapshots into a [`SnapshotStore`].
pub struct SnapshotPublisher<S: SnapshotStore> {
    store: S,
    config: StoreConfig,
}

impl<S: SnapshotStore> SnapshotPublisher<S> {
    pub fn new(store: S, config: StoreConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Publishes `observations` stamped with the current wall-clock time.
    pub fn publish(
        &self,
        filename: &str,
        observations: &[Observation],
    ) -> Result<PublishReceipt, PublishError> {
        self.publish_at(filename, observations, now_ms())
    }

    /// Publishes `observations` as the current snapshot.
    ///
    /// # Errors
    /// - `TooLarge` when the payload exceeds `max_snapshot_bytes`.
    /// - `Store` when a slot read or write fails, including revision conflicts.
    pub fn publish_at(
        &self,
        filename: &str,
        observations: &[Observation],
        uploaded_at_ms: i64,
    ) -> Result<PublishReceipt, PublishError> {
        let started_at = Instant::now();
        info!(
            "event=snapshot_publish module=store status=start rows={}",
            observations.len()
        );

        let result = self.publish_inner(filename, observations, uploaded_at_ms);
        match &result {
            Ok(receipt) => info!(
                "event=snapshot_publish module=store status=ok rows={} size_bytes={} revision={} backup={} removed_backups={} duration_ms={}",
                receipt.metadata.row_count,
                receipt.metadata.size_bytes,
                receipt.revision,
                receipt.metadata.replaced_backup.as_deref().unwrap_or("none"),
                receipt.removed_backups.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=snapshot_publish module=store status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn publish_inner(
        &self,
        filename: &str,
        observations: &[Observation],
        uploaded_at_ms: i64,
    ) -> Result<PublishReceipt, PublishError> {
        let payload = serde_json::to_vec(observations).map_err(|err| {
            StoreError::InvalidData(format!("cannot encode observations: {err}"))
        })?;
        let size_bytes = payload.len() as u64;
        if size_bytes > self.config.max_snapshot_bytes {
            return Err(PublishError::TooLarge {
                size_bytes,
                limit: self.config.max_snapshot_bytes,
            });
        }

        let current = self.read_optional(&self.config.current_slot)?;
        let backup = match &current {
            Some(previous) => Some(self.back_up(previous, uploaded_at_ms)?),
            None => None,
        };
        let replaced_backup = backup.as_ref().map(|(slot, _)| slot.clone());

        let metadata = SnapshotMetadata {
            filename: filename.to_string(),
            uploaded_at_ms,
            row_count: observations.len(),
            size_bytes,
            replaced_backup,
        };
        let package = SnapshotPackage {
            observations: observations.to_vec(),
            metadata,
        };
        let written = package.encode().and_then(|bytes| {
            self.store.put(
                &self.config.current_slot,
                &bytes,
                current.map(|previous| previous.revision),
            )
        });
        let revision = match written {
            Ok(revision) => revision,
            Err(err) => {
                if let Some((slot, backup_revision)) = &backup {
                    self.discard_backup(slot, *backup_revision);
                }
                return Err(err.into());
            }
        };

        let previous_metadata = self.read_optional(&self.config.metadata_slot)?;
        self.store.put(
            &self.config.metadata_slot,
            &package.metadata.encode()?,
            previous_metadata.map(|previous| previous.revision),
        )?;

        let removed_backups = self.cleanup_backups();
        Ok(PublishReceipt {
            revision,
            metadata: package.metadata,
            removed_backups,
        })
    }

    /// Copies `previous` into a fresh backup slot named after every existing one.
    fn back_up(
        &self,
        previous: &StoredObject,
        uploaded_at_ms: i64,
    ) -> StoreResult<(String, Revision)> {
        let newest = self
            .store
            .list(&self.config.backup_prefix)?
            .iter()
            .filter_map(|entry| self.config.parse_backup_slot(&entry.slot))
            .max();
        let slot = match newest {
            Some((stamp, sequence)) if stamp >= uploaded_at_ms.max(0) => {
                self.config.sequenced_backup_slot(stamp, sequence + 1)
            }
            _ => self.config.backup_slot(uploaded_at_ms),
        };
        let revision = self.store.put(&slot, &previous.bytes, None)?;
        Ok((slot, revision))
    }

    fn discard_backup(&self, slot: &str, revision: Revision) {
        if let Err(err) = self.store.delete(slot, revision) {
            warn!("event=snapshot_publish module=store status=error stage=rollback slot={slot} error={err}");
        }
    }

    /// Deletes backups beyond `keep_backups`, newest kept.
    ///
    /// Returns the slots that were deleted.
    pub fn cleanup_backups(&self) -> Vec<String> {
        let mut backups = match self.store.list(&self.config.backup_prefix) {
            Ok(backups) => backups,
            Err(err) => {
                warn!("event=backup_cleanup module=store status=error stage=list error={err}");
                return Vec::new();
            }
        };
        backups.sort_by(|left, right| right.slot.cmp(&left.slot));

        let mut removed = Vec::new();
        for stale in backups.into_iter().skip(self.config.keep_backups) {
            match self.store.delete(&stale.slot, stale.revision) {
                Ok(()) => removed.push(stale.slot),
                Err(err) => warn!(
                    "event=backup_cleanup module=store status=error stage=delete slot={} error={}",
                    stale.slot, err
                ),
            }
        }
        info!(
            "event=backup_cleanup module=store status=ok removed={} keep={}",
            removed.len(),
            self.config.keep_backups
        );
        removed
    }

    /// Current snapshot, or `None` before the first publish.
    pub fn load_current(&self) -> StoreResult<Option<SnapshotPackage>> {
        self.read_optional(&self.config.current_slot)?
            .map(|object| SnapshotPackage::decode(&object.bytes))
            .transpose()
    }

    /// Metadata of the last publish, or `None` before the first publish.
    pub fn load_metadata(&self) -> StoreResult<Option<SnapshotMetadata>> {
        self.read_optional(&self.config.metadata_slot)?
            .map(|object| SnapshotMetadata::decode(&object.bytes))
            .transpose()
    }

    pub fn storage_info(&self) -> StoreResult<StorageInfo> {
        let entries = self.store.list("")?;
        Ok(StorageInfo {
            total_slots: entries.len(),
            backup_slots: entries
                .iter()
                .filter(|entry| self.config.is_backup_slot(&entry.slot))
                .count(),
            total_bytes: entries.iter().map(|entry| entry.size_bytes).sum(),
        })
    }

    fn read_optional(&self, slot: &str) -> StoreResult<Option<StoredObject>> {
        match self.store.get(slot) {
            Ok(object) => Ok(Some(object)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}
