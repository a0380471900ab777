//! Update command implementation.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use serde_json::Value;

use waste_core::response::STATUS_OK;
use waste_core::{MovementService, Receipt, TrackingId, UpdateResult};
use waste_file::FileStore;

use super::read_json;
use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Waste tracking ID of the waste input to update
    pub tracking_id: String,

    /// JSON file with the receipt, `{ "movement": { ... } }` (use - for stdin)
    #[arg(long, default_value = "-")]
    pub json: String,
}

pub async fn run(config: &Config, args: UpdateArgs) -> Result<ExitCode> {
    let payload = read_json(&args.json)?;
    let service = config.service()?;

    match update(&service, &args.tracking_id, payload).await {
        Ok(result) => {
            if let Some(revision) = result.revision {
                output::field("Revision", &revision.to_string());
            }
            output::success(&format!("Updated waste input ({})", STATUS_OK));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => output::failure(&e),
    }
}

async fn update(
    service: &MovementService<FileStore>,
    tracking_id: &str,
    payload: Value,
) -> waste_core::Result<UpdateResult> {
    let tracking_id = TrackingId::new(tracking_id)?;
    // Validates the `{ movement: { apiCode } }` envelope before reaching the store.
    let receipt = Receipt::new(payload)?;
    service
        .update_receipt_movement(&tracking_id, receipt.movement().clone())
        .await
}
