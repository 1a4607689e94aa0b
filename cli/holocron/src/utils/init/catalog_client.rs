use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use holocron_catalog::{CatalogClient, Client, HOLOCRON_CATALOG_MOCK_DATA_VAR, MockClient};
use tracing::debug;

use crate::config::Config;

/// Initialize the catalog client
///
/// - Initialize a mock client if `_HOLOCRON_USE_CATALOG_MOCK` points to a file of mock responses
/// - Initialize a real client otherwise
pub fn init_catalog_client(config: &Config) -> Result<Client> {
    init_catalog_client_with(config, std::env::var_os(HOLOCRON_CATALOG_MOCK_DATA_VAR))
}

fn init_catalog_client_with(config: &Config, mock_data: Option<impl Into<PathBuf>>) -> Result<Client> {
    if let Some(path) = mock_data {
        let path = path.into();
        if !path.exists() {
            bail!("path to mock data file doesn't exist: {}", path.display());
        }

        debug!(mock_data_path = %path.display(), "using mock catalog client");
        let client = MockClient::new(Some(&path))
            .with_context(|| format!("could not load mock data from {}", path.display()))?;
        return Ok(client.into());
    }

    debug!("using catalog client with url: {}", config.catalog_url);
    let client = CatalogClient::new(config.catalog_client_config())
        .context("could not create catalog client")?;
    Ok(client.into())
}
