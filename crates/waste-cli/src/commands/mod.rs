//! Subcommand implementations.

pub mod create;
pub mod history;
pub mod show;
pub mod update;

use std::io::{self, Read};
use std::process::ExitCode;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::cli::Commands;
use crate::config::Config;

pub async fn handle(config: &Config, command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Create(args) => create::run(config, args).await,
        Commands::Update(args) => update::run(config, args).await,
        Commands::Show(args) => show::run(config, args).await,
        Commands::History(args) => history::run(config, args).await,
    }
}

/// Read a JSON document from a file, or from stdin when the path is `-`.
fn read_json(path: &str) -> Result<Value> {
    if path == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        serde_json::from_str(&buf).context("Invalid JSON from stdin")
    } else {
        let content = std::fs::read_to_string(path).context("Failed to read JSON file")?;
        serde_json::from_str(&content).context("Invalid JSON in file")
    }
}
