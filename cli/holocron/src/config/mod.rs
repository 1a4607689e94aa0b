use std::collections::{BTreeMap, HashMap};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config as HierarchicalConfig, Environment};
use holocron_catalog::{CatalogClientConfig, DEFAULT_CATALOG_URL};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Name of the holocron config directory
const HOLOCRON_DIR_NAME: &str = "holocron";
const HOLOCRON_CONFIG_DIR_VAR: &str = "HOLOCRON_CONFIG_DIR";
const HOLOCRON_ENV_PREFIX: &str = "HOLOCRON_";
pub const HOLOCRON_CONFIG_FILE: &str = "holocron.toml";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// The URL of the catalog API to use
    // Kept as a String, the client normalizes the trailing slash.
    pub catalog_url: String,

    /// Seconds to wait for a connection to the catalog
    pub connect_timeout: u64,

    /// Seconds to wait for a complete response
    pub request_timeout: u64,

    /// Replaces the default `holocron/<version>` user agent
    pub user_agent: Option<String>,

    /// Headers sent with every catalog request
    #[serde(default)]
    pub extra_headers: BTreeMap<String, String>,
}

impl Config {
    /// Creates a [Config] from the config files and the environment
    ///
    /// Sources, later ones override earlier ones:
    /// - built in defaults
    /// - `holocron.toml` in the user config directory
    /// - `holocron.toml` in `$HOLOCRON_CONFIG_DIR`
    /// - `HOLOCRON_*` environment variables
    pub fn parse() -> Result<Config> {
        let user_config_dir = dirs::config_dir().map(|dir| dir.join(HOLOCRON_DIR_NAME));
        let explicit_config_dir = env::var_os(HOLOCRON_CONFIG_DIR_VAR).map(PathBuf::from);

        debug!(
            ?user_config_dir,
            ?explicit_config_dir,
            "reading config"
        );

        let config_dirs = user_config_dir.iter().chain(explicit_config_dir.iter());
        Self::read(config_dirs, env::vars())
    }

    fn read<'a>(
        config_dirs: impl IntoIterator<Item = &'a PathBuf>,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Config> {
        let mut builder = HierarchicalConfig::builder()
            .set_default("catalog_url", DEFAULT_CATALOG_URL)?
            .set_default("connect_timeout", DEFAULT_TIMEOUT_SECS)?
            .set_default("request_timeout", DEFAULT_TIMEOUT_SECS)?;

        for dir in config_dirs {
            builder = builder.add_source(config_file(dir));
        }

        // override via env variables
        let holocron_envs = vars
            .into_iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(HOLOCRON_ENV_PREFIX)
                    .map(|k| (k.to_lowercase(), v))
            })
            .filter(|(k, _)| k != "config_dir")
            .collect::<HashMap<_, _>>();

        let builder = builder.add_source(
            Environment::default()
                .source(Some(holocron_envs))
                .try_parsing(true),
        );

        builder
            .build()?
            .try_deserialize()
            .context("Could not parse config")
    }

    /// Settings for the catalog transport
    pub fn catalog_client_config(&self) -> CatalogClientConfig {
        CatalogClientConfig {
            catalog_url: self.catalog_url.clone(),
            extra_headers: self.extra_headers.clone(),
            user_agent: self.user_agent.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout),
            request_timeout: Duration::from_secs(self.request_timeout),
        }
    }
}

fn config_file(dir: &Path) -> config::File<config::FileSourceFile, config::FileFormat> {
    config::File::from(dir.join(HOLOCRON_CONFIG_FILE))
        .format(config::FileFormat::Toml)
        .required(false)
}
