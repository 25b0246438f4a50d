pub mod issue_token;
pub mod rebuild;
pub mod seed;
pub mod services;

use anyhow::{bail, Result};
use osp_service::config::{Config, StorageBackend};

/// Commands that read or write the catalog are pointless against a store
/// that dies with this process.
pub fn require_postgres(config: &Config, command: &str) -> Result<()> {
    if config.storage != StorageBackend::Postgres {
        bail!(
            "`{}` needs OSP_STORAGE=postgres; for in-memory runs start osp_api with SEED_CATALOG=true",
            command
        );
    }
    Ok(())
}
