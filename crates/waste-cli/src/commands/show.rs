//! Show command implementation.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use waste_core::traits::RecordStore;
use waste_core::{Error, TrackingId, WasteMovementRecord};
use waste_file::FileStore;

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Waste tracking ID
    pub tracking_id: String,
}

pub async fn run(config: &Config, args: ShowArgs) -> Result<ExitCode> {
    let store = config.store();

    match show(&store, &args.tracking_id).await {
        Ok(record) => {
            output::json_pretty(&record)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => output::failure(&e),
    }
}

async fn show(store: &FileStore, tracking_id: &str) -> waste_core::Result<WasteMovementRecord> {
    let tracking_id = TrackingId::new(tracking_id)?;
    store
        .get(&tracking_id)
        .await?
        .ok_or(Error::NotFound { tracking_id })
}
