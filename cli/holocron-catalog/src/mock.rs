//! Canned response transport for tests and offline demos.
//!
//! Responses are served first in, first out, regardless of which operation
//! asks for them, and are decoded with the category of the request.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

use crate::client::ClientTrait;
use crate::error::CatalogClientError;
use crate::types::{Category, Envelope, Record};

/// Points at a JSON file of [MockResponse]s to use instead of the real catalog.
pub const HOLOCRON_CATALOG_MOCK_DATA_VAR: &str = "_HOLOCRON_USE_CATALOG_MOCK";

// Arc allows pushing responses into the client from outside the client
// Mutex allows sharing across threads (necessary because of tokio)
type MockField<T> = Arc<Mutex<T>>;

/// A failed response, only the status is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockError {
    pub status: u16,
}

/// A single canned response.
///
/// Raw JSON is kept so one response file can serve any category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MockResponse {
    Error(MockError),
    Page(Envelope<serde_json::Value>),
    Record(serde_json::Value),
}

/// A request received by the mock, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockRequest {
    Page {
        category: Category,
        page: u32,
    },
    Search {
        category: Category,
        page: u32,
        query: String,
    },
    Record {
        category: Category,
        id: u32,
    },
}

#[derive(Debug, Error)]
pub enum MockDataError {
    /// Failed to read the JSON file pointed at by the mock data variable
    #[error("failed to read mock response file")]
    ReadMockFile(#[source] std::io::Error),
    /// Failed to parse the contents of the mock data file as JSON
    #[error("failed to parse mock data as JSON")]
    ParseJson(#[source] serde_json::Error),
    /// Every canned response has been consumed
    #[error("no mock response left for {0:?}")]
    Exhausted(MockRequest),
    /// The next canned response does not fit the request
    #[error("mock response does not match {0:?}")]
    Mismatch(MockRequest),
}

/// Reads a list of mock responses from disk.
fn read_mock_responses(path: impl AsRef<Path>) -> Result<VecDeque<MockResponse>, MockDataError> {
    let contents = std::fs::read_to_string(path).map_err(MockDataError::ReadMockFile)?;
    let deserialized: Vec<MockResponse> =
        serde_json::from_str(&contents).map_err(MockDataError::ParseJson)?;
    Ok(deserialized.into())
}

/// A catalog client that can be seeded with mock responses
#[derive(Debug, Clone)]
pub struct MockClient {
    pub mock_responses: MockField<VecDeque<MockResponse>>,
    requests: MockField<Vec<MockRequest>>,
    /// Responses are held back while this is `false`.
    gate: Arc<watch::Sender<bool>>,
}

impl Default for MockClient {
    fn default() -> Self {
        Self {
            mock_responses: Default::default(),
            requests: Default::default(),
            gate: Arc::new(watch::Sender::new(true)),
        }
    }
}

impl MockClient {
    /// Create a new mock client, potentially reading mock responses from disk
    pub fn new(mock_data_path: Option<impl AsRef<Path>>) -> Result<Self, MockDataError> {
        let client = Self::default();
        if let Some(path) = mock_data_path {
            let responses = read_mock_responses(&path)?;
            debug!(n_responses = responses.len(), "read mock responses");
            *lock(&client.mock_responses) = responses;
        }
        Ok(client)
    }

    /// Push a page envelope into the list of mock responses
    pub fn push_page(&self, envelope: Envelope<Record>) {
        let raw = envelope.map(|record| {
            serde_json::to_value(record).unwrap_or(serde_json::Value::Null)
        });
        lock(&self.mock_responses).push_back(MockResponse::Page(raw));
    }

    /// Push a single record into the list of mock responses
    pub fn push_record(&self, record: Record) {
        let raw = serde_json::to_value(record).unwrap_or(serde_json::Value::Null);
        lock(&self.mock_responses).push_back(MockResponse::Record(raw));
    }

    /// Push a failed response into the list of mock responses
    pub fn push_error(&self, status: StatusCode) {
        lock(&self.mock_responses).push_back(MockResponse::Error(MockError {
            status: status.as_u16(),
        }));
    }

    /// Every request received so far, in call order.
    pub fn requests(&self) -> Vec<MockRequest> {
        lock(&self.requests).clone()
    }

    /// Number of canned responses not yet served.
    pub fn remaining(&self) -> usize {
        lock(&self.mock_responses).len()
    }

    /// Hold back responses until [MockClient::resume] is called.
    ///
    /// Requests are still logged while paused.
    pub fn pause(&self) {
        self.gate.send_replace(false);
    }

    pub fn resume(&self) {
        self.gate.send_replace(true);
    }

    /// Log the request, wait for the gate and take the next response.
    async fn respond(&self, request: MockRequest) -> Result<MockResponse, CatalogClientError> {
        lock(&self.requests).push(request.clone());

        let mut gate = self.gate.subscribe();
        // the sender lives in `self`, so the channel cannot close here
        let _ = gate.wait_for(|open| *open).await;

        let response = lock(&self.mock_responses).pop_front();
        let response = response.ok_or_else(|| MockDataError::Exhausted(request.clone()))?;

        if let MockResponse::Error(MockError { status }) = response {
            let status = StatusCode::from_u16(status)
                .map_err(|e| CatalogClientError::Other(e.to_string()))?;
            return Err(CatalogClientError::Status {
                status,
                url: format!("mock://{request:?}"),
            });
        }
        Ok(response)
    }

    async fn respond_page(
        &self,
        request: MockRequest,
        category: Category,
    ) -> Result<Envelope<Record>, CatalogClientError> {
        match self.respond(request.clone()).await? {
            MockResponse::Page(raw) => {
                let value = serde_json::to_value(raw).map_err(CatalogClientError::Decode)?;
                category
                    .decode_envelope(value)
                    .map_err(CatalogClientError::Decode)
            },
            _ => Err(MockDataError::Mismatch(request).into()),
        }
    }
}

impl ClientTrait for MockClient {
    async fn fetch_page(
        &self,
        category: Category,
        page: u32,
    ) -> Result<Envelope<Record>, CatalogClientError> {
        self.respond_page(MockRequest::Page { category, page }, category)
            .await
    }

    async fn search_page(
        &self,
        category: Category,
        page: u32,
        query: &str,
    ) -> Result<Envelope<Record>, CatalogClientError> {
        let request = MockRequest::Search {
            category,
            page,
            query: query.to_string(),
        };
        self.respond_page(request, category).await
    }

    async fn fetch_record(
        &self,
        category: Category,
        id: u32,
    ) -> Result<Record, CatalogClientError> {
        let request = MockRequest::Record { category, id };
        match self.respond(request.clone()).await? {
            MockResponse::Record(raw) => category
                .decode_record(raw)
                .map_err(CatalogClientError::Decode),
            _ => Err(MockDataError::Mismatch(request).into()),
        }
    }
}

fn lock<T>(field: &Mutex<T>) -> MutexGuard<'_, T> {
    field.lock().unwrap_or_else(PoisonError::into_inner)
}
