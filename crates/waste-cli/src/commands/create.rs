//! Create command implementation.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use waste_core::response::STATUS_NO_CONTENT;
use waste_core::{MovementService, Receipt, TrackingId, WasteMovementRecord};
use waste_file::FileStore;

use super::read_json;
use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Waste tracking ID for the new waste input
    pub tracking_id: String,

    /// JSON file with the receipt, `{ "movement": { ... } }` (use - for stdin)
    #[arg(long, default_value = "-")]
    pub json: String,
}

pub async fn run(config: &Config, args: CreateArgs) -> Result<ExitCode> {
    let payload = read_json(&args.json)?;
    let service = config.service()?;

    match create(&service, &args.tracking_id, payload).await {
        Ok(record) => {
            output::field("Tracking ID", record.tracking_id.as_str());
            output::field("Revision", &record.revision.to_string());
            output::success(&format!("Created waste input ({})", STATUS_NO_CONTENT));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => output::failure(&e),
    }
}

async fn create(
    service: &MovementService<FileStore>,
    tracking_id: &str,
    payload: serde_json::Value,
) -> waste_core::Result<WasteMovementRecord> {
    let tracking_id = TrackingId::new(tracking_id)?;
    let receipt = Receipt::new(payload)?;
    service.create_receipt_movement(&tracking_id, receipt).await
}
