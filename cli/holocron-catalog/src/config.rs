//! Configuration types for catalog client construction.

use std::collections::BTreeMap;
use std::time::Duration;

/// Public SWAPI mirror used when nothing else is configured.
pub const DEFAULT_CATALOG_URL: &str = "https://swapi.dev/api/";

/// Configuration for catalog client construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogClientConfig {
    /// Base URL for the catalog API, endpoints are joined onto it.
    pub catalog_url: String,
    /// Additional headers to include in requests.
    pub extra_headers: BTreeMap<String, String>,
    /// Overrides the default `holocron/<version>` user agent.
    pub user_agent: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for CatalogClientConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            extra_headers: BTreeMap::new(),
            user_agent: None,
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(30),
        }
    }
}
