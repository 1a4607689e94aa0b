//! HTTP client and record model for the Star Wars catalog API.
//!
//! This crate provides:
//! - The six catalog record types and the generic paginated [Envelope]
//! - The [Category] table that selects endpoints and envelope types
//! - A [ClientTrait] transport with an HTTP ([CatalogClient]) and a canned
//!   response ([MockClient]) implementation
//!
//! ## Usage
//!
//! ```ignore
//! use holocron_catalog::{CatalogClient, CatalogClientConfig, Category, ClientTrait};
//!
//! let client = CatalogClient::new(CatalogClientConfig::default())?;
//! let page = client.fetch_page(Category::People, 1).await?;
//! ```

mod client;
mod config;
mod error;
mod mock;
pub mod types;

pub use client::{CatalogClient, Client, ClientTrait};
pub use config::{CatalogClientConfig, DEFAULT_CATALOG_URL};
pub use error::CatalogClientError;
pub use mock::{
    MockClient,
    MockDataError,
    MockError,
    MockRequest,
    MockResponse,
    HOLOCRON_CATALOG_MOCK_DATA_VAR,
};
pub use reqwest::StatusCode;
pub use types::{Category, Envelope, Record, UnknownCategory};
