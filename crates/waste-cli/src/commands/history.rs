//! History command implementation.
//!
//! Prints one JSON object per line, oldest revision first.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use waste_core::traits::RecordStore;
use waste_core::{Error, HistoryEntry, TrackingId};
use waste_file::FileStore;

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Waste tracking ID
    pub tracking_id: String,
}

pub async fn run(config: &Config, args: HistoryArgs) -> Result<ExitCode> {
    let store = config.store();

    match history(&store, &args.tracking_id).await {
        Ok(entries) => {
            for entry in &entries {
                output::json(entry)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => output::failure(&e),
    }
}

async fn history(store: &FileStore, tracking_id: &str) -> waste_core::Result<Vec<HistoryEntry>> {
    let tracking_id = TrackingId::new(tracking_id)?;
    let entries = store.history(&tracking_id).await?;

    if entries.is_empty() {
        return Err(Error::NotFound { tracking_id });
    }

    Ok(entries)
}
