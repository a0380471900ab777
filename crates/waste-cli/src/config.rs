//! Runtime configuration resolved from flags and environment.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing::debug;

use waste_core::{CredentialRegistry, MovementService};
use waste_file::FileStore;

use crate::cli::Cli;

/// Resolved configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_dir: PathBuf,
    org_api_codes: Option<String>,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let store_dir = match &cli.store {
            Some(dir) => dir.clone(),
            None => default_store_dir()?,
        };

        debug!(store = %store_dir.display(), "Resolved store directory");

        Ok(Self {
            store_dir,
            org_api_codes: cli.org_api_codes.clone(),
        })
    }

    pub fn store(&self) -> FileStore {
        FileStore::new(&self.store_dir)
    }

    /// Decode the credential registry.
    ///
    /// The registry is required; running without `ORG_API_CODES` is a
    /// configuration error rather than an empty registry.
    pub fn registry(&self) -> Result<Arc<CredentialRegistry>> {
        let encoded = self
            .org_api_codes
            .as_deref()
            .context("ORG_API_CODES is not set. Pass --org-api-codes or set the variable.")?;

        let registry =
            CredentialRegistry::load(encoded).context("Failed to load ORG_API_CODES")?;

        Ok(Arc::new(registry))
    }

    pub fn service(&self) -> Result<MovementService<FileStore>> {
        Ok(MovementService::new(self.registry()?, self.store()))
    }
}

fn default_store_dir() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "waste").context("Could not determine data directory")?;

    Ok(dirs.data_dir().join("store"))
}
