//! Catalog client for the Star Wars catalog REST API.

use std::fmt::Debug;
use std::str::FromStr;

use enum_dispatch::enum_dispatch;
use reqwest::header::{self, HeaderMap};
use tracing::{debug, instrument};
use url::Url;

use crate::config::CatalogClientConfig;
use crate::error::CatalogClientError;
use crate::mock::MockClient;
use crate::types::{Category, Envelope, Record};

const USER_AGENT: &str = concat!("holocron/", env!("CARGO_PKG_VERSION"));

/// Either a client for the actual catalog service,
/// or a mock client for testing.
#[derive(Debug)]
#[enum_dispatch(ClientTrait)]
pub enum Client {
    Catalog(CatalogClient),
    Mock(MockClient),
}

/// The catalog API interface consumed by the pagination core.
///
/// This trait enables alternate implementations:
/// - **HTTP**: REST calls to the catalog via [`CatalogClient`]
/// - **Mock**: canned responses without HTTP via [`MockClient`]
#[enum_dispatch]
#[allow(async_fn_in_trait)]
pub trait ClientTrait {
    /// Fetch one page of a category listing.
    async fn fetch_page(
        &self,
        category: Category,
        page: u32,
    ) -> Result<Envelope<Record>, CatalogClientError>;

    /// Fetch one page of a category filtered by a free text query.
    async fn search_page(
        &self,
        category: Category,
        page: u32,
        query: &str,
    ) -> Result<Envelope<Record>, CatalogClientError>;

    /// Fetch a single record by its numeric id.
    async fn fetch_record(&self, category: Category, id: u32)
        -> Result<Record, CatalogClientError>;
}

/// A client for the catalog service.
///
/// Handles:
/// - HTTP client configuration with timeouts and user agent
/// - Extra default headers
/// - Endpoint selection and envelope decoding per [Category]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: Url,
    config: CatalogClientConfig,
}

impl Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("catalog_url", &self.config.catalog_url)
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a new catalog client from configuration.
    pub fn new(config: CatalogClientConfig) -> Result<Self, CatalogClientError> {
        let base_url = parse_base_url(&config.catalog_url)?;
        let client = build_http_client(&config)?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Get the configured catalog URL.
    pub fn catalog_url(&self) -> &str {
        &self.config.catalog_url
    }

    /// Update the client configuration and recreate the client.
    pub fn update_config(
        &mut self,
        update: impl FnOnce(&mut CatalogClientConfig),
    ) -> Result<(), CatalogClientError> {
        let mut modified_config = self.config.clone();
        update(&mut modified_config);
        *self = Self::new(modified_config)?;
        Ok(())
    }

    /// `{base}/{endpoint}/`
    fn endpoint_url(&self, category: Category) -> Result<Url, CatalogClientError> {
        let path = format!("{}/", category.endpoint());
        self.base_url
            .join(&path)
            .map_err(|source| CatalogClientError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                source,
            })
    }

    async fn get(&self, url: Url) -> Result<Vec<u8>, CatalogClientError> {
        debug!(%url, "sending catalog request");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(CatalogClientError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogClientError::Status {
                status,
                url: url.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(CatalogClientError::Request)?;
        Ok(body.to_vec())
    }

    async fn get_envelope(
        &self,
        category: Category,
        url: Url,
    ) -> Result<Envelope<Record>, CatalogClientError> {
        let body = self.get(url).await?;
        let mut deserializer = serde_json::Deserializer::from_slice(&body);
        let envelope = category
            .decode_envelope(&mut deserializer)
            .and_then(|envelope| deserializer.end().map(|_| envelope))
            .map_err(CatalogClientError::Decode)?;

        debug!(
            %category,
            n_results = envelope.results.len(),
            has_next = envelope.has_next(),
            "received catalog page"
        );
        Ok(envelope)
    }
}

impl ClientTrait for CatalogClient {
    #[instrument(skip(self), fields(progress = "Fetching catalog page"))]
    async fn fetch_page(
        &self,
        category: Category,
        page: u32,
    ) -> Result<Envelope<Record>, CatalogClientError> {
        let mut url = self.endpoint_url(category)?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string());
        self.get_envelope(category, url).await
    }

    #[instrument(skip(self), fields(progress = "Searching catalog"))]
    async fn search_page(
        &self,
        category: Category,
        page: u32,
        query: &str,
    ) -> Result<Envelope<Record>, CatalogClientError> {
        let mut url = self.endpoint_url(category)?;
        url.query_pairs_mut()
            .append_pair("search", query)
            .append_pair("page", &page.to_string());
        self.get_envelope(category, url).await
    }

    #[instrument(skip(self))]
    async fn fetch_record(
        &self,
        category: Category,
        id: u32,
    ) -> Result<Record, CatalogClientError> {
        let url = self
            .endpoint_url(category)?
            .join(&format!("{id}/"))
            .map_err(|source| CatalogClientError::InvalidUrl {
                url: format!("{}{id}/", self.base_url),
                source,
            })?;
        let body = self.get(url).await?;
        let mut deserializer = serde_json::Deserializer::from_slice(&body);
        category
            .decode_record(&mut deserializer)
            .and_then(|record| deserializer.end().map(|_| record))
            .map_err(CatalogClientError::Decode)
    }
}

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Parse the configured base url, making sure endpoints join below it.
///
/// `Url::join` replaces the last path segment unless the path ends with `/`.
fn parse_base_url(catalog_url: &str) -> Result<Url, CatalogClientError> {
    let normalized = if catalog_url.ends_with('/') {
        catalog_url.to_string()
    } else {
        format!("{catalog_url}/")
    };
    Url::parse(&normalized).map_err(|source| CatalogClientError::InvalidUrl {
        url: catalog_url.to_string(),
        source,
    })
}

/// Build the HTTP client with timeouts, user agent and extra headers.
fn build_http_client(config: &CatalogClientConfig) -> Result<reqwest::Client, CatalogClientError> {
    let mut headers = HeaderMap::new();

    for (key, value) in &config.extra_headers {
        headers.insert(
            header::HeaderName::from_str(key).map_err(
                |e: reqwest::header::InvalidHeaderName| CatalogClientError::Other(e.to_string()),
            )?,
            header::HeaderValue::from_str(value).map_err(
                |e: reqwest::header::InvalidHeaderValue| CatalogClientError::Other(e.to_string()),
            )?,
        );
    }

    debug!(
        catalog_url = %config.catalog_url,
        extra_headers = config.extra_headers.len(),
        "building catalog HTTP client"
    );

    let user_agent = config.user_agent.as_deref().unwrap_or(USER_AGENT);

    reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| CatalogClientError::Other(e.to_string()))
}
