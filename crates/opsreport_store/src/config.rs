use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENT_SLOT: &str = "current_dashboard_data.json";
pub const DEFAULT_METADATA_SLOT: &str = "upload_metadata.json";
pub const DEFAULT_BACKUP_PREFIX: &str = "backup_";
pub const DEFAULT_KEEP_BACKUPS: usize = 2;
pub const DEFAULT_MAX_SNAPSHOT_BYTES: u64 = 25 * 1024 * 1024;

/// Slot layout and retention policy of the publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub current_slot: String,
    pub metadata_slot: String,
    pub backup_prefix: String,
    /// Backups kept after each publish, newest first.
    pub keep_backups: usize,
    pub max_snapshot_bytes: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            current_slot: DEFAULT_CURRENT_SLOT.to_string(),
            metadata_slot: DEFAULT_METADATA_SLOT.to_string(),
            backup_prefix: DEFAULT_BACKUP_PREFIX.to_string(),
            keep_backups: DEFAULT_KEEP_BACKUPS,
            max_snapshot_bytes: DEFAULT_MAX_SNAPSHOT_BYTES,
        }
    }
}

impl StoreConfig {
    /// Backup slot for a snapshot replaced at `uploaded_at_ms`.
    ///
    /// The timestamp is zero-padded so name order is chronological order.
    pub fn backup_slot(&self, uploaded_at_ms: i64) -> String {
        self.sequenced_backup_slot(uploaded_at_ms, 0)
    }

    /// Backup slot with a tie-break `sequence` for replacements stamped in the
    /// same millisecond. Sequence `0` is the plain name and sorts first.
    pub fn sequenced_backup_slot(&self, uploaded_at_ms: i64, sequence: u32) -> String {
        let stamp = uploaded_at_ms.max(0);
        match sequence {
            0 => format!("{}{stamp:013}.json", self.backup_prefix),
            _ => format!("{}{stamp:013}_{sequence:04}.json", self.backup_prefix),
        }
    }

    /// Timestamp and sequence encoded in a backup slot name.
    pub fn parse_backup_slot(&self, slot: &str) -> Option<(i64, u32)> {
        let stem = slot
            .strip_prefix(self.backup_prefix.as_str())?
            .strip_suffix(".json")?;
        let (stamp, sequence) = match stem.split_once('_') {
            Some((stamp, sequence)) => (stamp, sequence.parse().ok()?),
            None => (stem, 0),
        };
        Some((stamp.parse().ok()?, sequence))
    }

    pub fn is_backup_slot(&self, slot: &str) -> bool {
        slot.starts_with(&self.backup_prefix)
    }
}
