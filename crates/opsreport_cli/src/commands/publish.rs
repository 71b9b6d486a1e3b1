use crate::commands::{read_observations, to_json, write_stdout};
use crate::error::CliError;
use clap::Args;
use opsreport_store::{open_store_db, SnapshotPublisher, SqliteSnapshotStore, StoreConfig};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// JSON array of observations to publish.
    #[arg(long)]
    pub input: PathBuf,

    /// Snapshot database, created on first use.
    #[arg(long)]
    pub store: PathBuf,

    /// Name recorded in the metadata; defaults to the input file name.
    #[arg(long)]
    pub filename: Option<String>,

    /// Number of backups retained after the publish.
    #[arg(long)]
    pub keep_backups: Option<usize>,
}

pub fn run(args: PublishArgs) -> Result<(), CliError> {
    let observations = read_observations(&args.input)?;
    let filename = args.filename.clone().unwrap_or_else(|| {
        args.input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let mut config = StoreConfig::default();
    if let Some(keep) = args.keep_backups {
        config.keep_backups = keep;
    }

    let conn = open_store_db(&args.store)?;
    let store = SqliteSnapshotStore::new(&conn);
    let receipt = SnapshotPublisher::new(&store, config).publish(&filename, &observations)?;
    write_stdout(&to_json(&receipt)?)
}
