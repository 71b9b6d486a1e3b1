//! Snapshot persistence for published report data.
//! Keeps the current observation set, its metadata and a bounded backup trail.

pub mod config;
pub mod db;
pub mod package;
pub mod publisher;
pub mod slot_store;

pub use config::StoreConfig;
pub use db::{open_store_db, open_store_db_in_memory, DbError, DbResult};
pub use package::{SnapshotMetadata, SnapshotPackage};
pub use publisher::{PublishError, PublishReceipt, SnapshotPublisher, StorageInfo};
pub use slot_store::{
    Revision, SlotEntry, SnapshotStore, SqliteSnapshotStore, StoreError, StoreResult,
    StoredObject,
};
