pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

pub use cli::AppCommand;

use crate::core::Ledger;
use crate::core::config::AppConfig;
use crate::providers::AwesomeApiProvider;
use crate::store::DiskStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxledger starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let data_path = config.data_path()?;
    let store = DiskStore::open(&data_path)
        .with_context(|| format!("Failed to open data store at {}", data_path.display()))?;
    let rates = Arc::new(AwesomeApiProvider::new(&config.providers.awesomeapi)?);
    let ledger = Ledger::open(&store, rates)?;

    cli::execute(command, &ledger).await
}
