//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{create, history, show, update};

/// Record and amend waste movement receipts.
#[derive(Parser, Debug)]
#[command(name = "waste")]
#[command(author, version = env!("WASTE_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Store directory (defaults to the platform data directory)
    #[arg(long, env = "WASTE_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Base64 encoded list of `apiCode=organisationId` pairs
    #[arg(long, env = "ORG_API_CODES", global = true, hide_env_values = true)]
    pub org_api_codes: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a waste input from a receipt movement
    Create(create::CreateArgs),

    /// Update the receipt movement of an existing waste input
    Update(update::UpdateArgs),

    /// Show the current waste input
    Show(show::ShowArgs),

    /// Print every revision of a waste input, one JSON object per line
    History(history::HistoryArgs),
}
