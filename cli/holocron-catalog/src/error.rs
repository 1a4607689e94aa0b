//! Error handling for catalog API operations.

use reqwest::StatusCode;
use thiserror::Error;

use crate::mock::MockDataError;

/// Common error type for catalog API operations.
///
/// Every variant is a transport level failure from the point of view of the
/// pagination core: the request did not produce a usable page.
#[derive(Debug, Error)]
pub enum CatalogClientError {
    #[error("could not reach the catalog")]
    Request(#[source] reqwest::Error),
    #[error("{status}: request to '{url}' failed")]
    Status { status: StatusCode, url: String },
    #[error("catalog response could not be decoded")]
    Decode(#[source] serde_json::Error),
    #[error("invalid catalog url '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error(transparent)]
    Mock(#[from] MockDataError),
    #[error("{0}")]
    Other(String),
}

impl CatalogClientError {
    /// The HTTP status of the failed response, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            CatalogClientError::Status { status, .. } => Some(*status),
            CatalogClientError::Request(err) => err.status(),
            _ => None,
        }
    }
}
