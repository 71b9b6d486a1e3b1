use crate::commands::{to_json, write_stdout};
use crate::error::CliError;
use clap::Args;
use opsreport_store::{
    open_store_db, SnapshotMetadata, SnapshotPublisher, SqliteSnapshotStore, StorageInfo,
    StoreConfig,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Snapshot database.
    #[arg(long)]
    pub store: PathBuf,
}

#[derive(Serialize)]
struct StoreReport {
    storage: StorageInfo,
    last_publish: Option<SnapshotMetadata>,
}

pub fn run(args: InfoArgs) -> Result<(), CliError> {
    let conn = open_store_db(&args.store)?;
    let store = SqliteSnapshotStore::new(&conn);
    let publisher = SnapshotPublisher::new(&store, StoreConfig::default());

    let report = StoreReport {
        storage: publisher.storage_info()?,
        last_publish: publisher.load_metadata()?,
    };
    write_stdout(&to_json(&report)?)
}
