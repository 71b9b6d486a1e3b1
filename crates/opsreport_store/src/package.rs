//! Published snapshot payloads.

use crate::slot_store::{StoreError, StoreResult};
use opsreport_core::Observation;
use serde::{Deserialize, Serialize};

/// Description of one published snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// Name of the source file the observations were loaded from.
    pub filename: String,
    pub uploaded_at_ms: i64,
    pub row_count: usize,
    /// Encoded size of the observation payload.
    pub size_bytes: u64,
    /// Backup slot that received the snapshot this one replaced.
    #[serde(default)]
    pub replaced_backup: Option<String>,
}

/// Observations plus their metadata, stored as one JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPackage {
    pub observations: Vec<Observation>,
    pub metadata: SnapshotMetadata,
}

impl SnapshotPackage {
    pub fn encode(&self) -> StoreResult<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|err| StoreError::InvalidData(format!("cannot encode snapshot: {err}")))
    }

    pub fn decode(bytes: &[u8]) -> StoreResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|err| StoreError::InvalidData(format!("cannot decode snapshot: {err}")))
    }
}

impl SnapshotMetadata {
    pub fn encode(&self) -> StoreResult<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|err| StoreError::InvalidData(format!("cannot encode metadata: {err}")))
    }

    pub fn decode(bytes: &[u8]) -> StoreResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|err| StoreError::InvalidData(format!("cannot decode metadata: {err}")))
    }
}
