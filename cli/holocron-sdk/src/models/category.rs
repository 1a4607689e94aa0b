//! Incremental listing of one catalog category.
//!
//! A [CategoryLoader] fetches one page per request and appends it to the
//! records it has accumulated so far. The page to fetch next is taken from
//! the `next` link of the last envelope.

use std::sync::{Arc, Mutex};

use holocron_catalog::{Category, Client, ClientTrait, Envelope, Record};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info_span, warn};
use url::Url;

use super::session::{SessionScope, lock};
use super::state::StateSurface;

/// The page a listing starts at, also used when a cursor can't be read.
pub const DEFAULT_PAGE: u32 = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CursorError {
    #[error("malformed page cursor '{0}'")]
    Malformed(String),
}

/// Read the page number out of a `next` link.
///
/// Accepts an absolute url carrying a `page` query parameter, or a bare
/// page number.
pub fn page_from_cursor(cursor: &str) -> Result<u32, CursorError> {
    let cursor = cursor.trim();
    if let Ok(page) = cursor.parse::<u32>() {
        return Ok(page);
    }

    let malformed = || CursorError::Malformed(cursor.to_string());
    let url = Url::parse(cursor).map_err(|_| malformed())?;
    url.query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, page)| page.parse().ok())
        .ok_or_else(malformed)
}

#[derive(Debug, Default)]
struct LoaderState {
    category: Option<Category>,
    accumulated: Vec<Record>,
    cursor: u32,
    next: Option<String>,
    in_flight: bool,
    scope: SessionScope,
}

impl LoaderState {
    fn apply_page(&mut self, category: Category, envelope: Envelope<Record>) {
        let Envelope {
            next, mut results, ..
        } = envelope;

        category.order_page(&mut results);

        self.cursor = match next.as_deref().map(page_from_cursor) {
            Some(Ok(page)) => page,
            Some(Err(err)) => {
                debug!(%err, "falling back to the first page");
                DEFAULT_PAGE
            },
            None => DEFAULT_PAGE,
        };
        self.next = next;
        self.accumulated.extend(results);
    }
}

/// Loads a category page by page into a [StateSurface].
///
/// Methods that start a fetch spawn a Tokio task and must be called from
/// within a Tokio runtime.
#[derive(Debug)]
pub struct CategoryLoader {
    client: Arc<Client>,
    state: Arc<Mutex<LoaderState>>,
    surface: StateSurface,
}

impl CategoryLoader {
    pub fn new(client: Arc<Client>) -> Self {
        Self {
            client,
            state: Default::default(),
            surface: StateSurface::default(),
        }
    }

    /// Start listing `category` from its first page.
    ///
    /// Any fetch still running for a previously opened category is
    /// cancelled and its response dropped.
    pub fn open(&self, category: Category) -> StateSurface {
        let token = {
            let mut state = lock(&self.state);
            let token = state.scope.renew();
            state.category = Some(category);
            state.accumulated.clear();
            state.cursor = DEFAULT_PAGE;
            state.next = None;
            state.in_flight = true;

            self.surface.publish_list(&state.accumulated);
            self.surface.set_error(false);
            self.surface.set_loading(true);
            token
        };

        debug!(%category, "opening category");
        self.spawn_fetch(category, DEFAULT_PAGE, token);
        self.surface.clone()
    }

    /// Fetch the page after the last one received.
    ///
    /// Does nothing on the last page. Calls made while a page is still
    /// loading are ignored.
    pub fn load_next_page(&self) {
        let (category, page, token) = {
            let mut state = lock(&self.state);
            let Some(category) = state.category else {
                debug!("no category open, nothing to load");
                return;
            };
            if state.next.is_none() {
                debug!(%category, "already on the last page");
                return;
            }
            if state.in_flight {
                warn!(%category, "a page is still loading, ignoring request for the next one");
                return;
            }

            state.in_flight = true;
            self.surface.set_loading(true);
            (category, state.cursor, state.scope.token())
        };

        self.spawn_fetch(category, page, token);
    }

    /// Whether the last page received links to another one.
    pub fn has_next_page(&self) -> bool {
        lock(&self.state).next.is_some()
    }

    pub fn category(&self) -> Option<Category> {
        lock(&self.state).category
    }

    pub fn get_item(&self, position: usize) -> Option<Record> {
        self.surface.get_item(position)
    }

    pub fn get_count(&self) -> usize {
        self.surface.get_count()
    }

    pub fn surface(&self) -> &StateSurface {
        &self.surface
    }

    /// Cancel any running fetch, the accumulated list stays published.
    pub fn dispose(&self) {
        let mut state = lock(&self.state);
        state.scope.cancel();
        state.category = None;
        state.next = None;
        state.in_flight = false;
        self.surface.set_loading(false);
    }

    fn spawn_fetch(&self, category: Category, page: u32, token: CancellationToken) {
        let client = Arc::clone(&self.client);
        let state = Arc::clone(&self.state);
        let surface = self.surface.clone();

        let fetch = async move {
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("fetch cancelled");
                    return;
                },
                result = client.fetch_page(category, page) => result,
            };

            let mut state = lock(&state);
            if token.is_cancelled() {
                debug!("discarding response of a cancelled fetch");
                return;
            }
            state.in_flight = false;

            match result {
                Ok(envelope) => {
                    state.apply_page(category, envelope);
                    debug!(count = state.accumulated.len(), "page loaded");

                    surface.publish_list(&state.accumulated);
                    surface.set_error(false);
                    surface.set_loading(false);
                },
                Err(err) => {
                    error!(%err, "failed to load page");
                    surface.set_error(true);
                    surface.set_loading(false);
                },
            }
        };

        tokio::spawn(fetch.instrument(info_span!("fetch_page", %category, page)));
    }
}

impl Drop for CategoryLoader {
    fn drop(&mut self) {
        self.dispose();
    }
}
