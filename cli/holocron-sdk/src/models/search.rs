//! Full text search across every page of a category.
//!
//! A search walks the filtered listing page by page until the last one,
//! merging results as they arrive, and publishes the merged list once,
//! ranked by relevance, when the walk is complete. Changing the query or
//! category abandons a running walk.

use std::future::Future;
use std::sync::{Arc, Mutex};

use async_stream::try_stream;
use futures::{Stream, StreamExt, pin_mut};
use holocron_catalog::{Category, Client, ClientTrait, Envelope, Record};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info_span};

use super::ranking::rank;
use super::session::{SessionScope, lock};
use super::state::StateSurface;

const FIRST_PAGE: u32 = 1;

/// Queries of at most this many characters don't start a search.
const MIN_QUERY_CHARS: usize = 1;

#[derive(Debug)]
struct SearchState {
    query: String,
    category: Category,
    accumulated: Vec<Record>,
    scope: SessionScope,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: String::new(),
            category: Category::ALL[0],
            accumulated: Vec::new(),
            scope: SessionScope::default(),
        }
    }
}

/// Create a stream of pages from a page-fetching function.
///
/// Pages are requested one after another starting at the first page,
/// and the stream ends after the first page without a `next` link.
fn walk_pages<E, Fut>(fetch: impl Fn(u32) -> Fut) -> impl Stream<Item = Result<Envelope<Record>, E>>
where
    Fut: Future<Output = Result<Envelope<Record>, E>>,
{
    try_stream! {
        let mut page = FIRST_PAGE;
        loop {
            let envelope = fetch(page).await?;
            let last = !envelope.has_next();
            yield envelope;

            if last {
                break;
            }
            page += 1;
        }
    }
}

/// Searches one category at a time and publishes ranked results.
///
/// Methods that start a search spawn a Tokio task and must be called from
/// within a Tokio runtime.
#[derive(Debug)]
pub struct SearchOrchestrator {
    client: Arc<Client>,
    state: Arc<Mutex<SearchState>>,
    surface: StateSurface,
}

impl SearchOrchestrator {
    pub fn new(client: Arc<Client>) -> Self {
        Self {
            client,
            state: Default::default(),
            surface: StateSurface::default(),
        }
    }

    /// Set both inputs without searching.
    pub fn set_query_and_category(&self, query: impl Into<String>, category: Category) {
        let mut state = lock(&self.state);
        state.query = query.into();
        state.category = category;
    }

    /// Switch category and search it with the current query.
    pub fn set_category(&self, category: Category) {
        lock(&self.state).category = category;
        self.restart();
    }

    /// Update the query.
    ///
    /// An unchanged query is ignored. A new search starts only for queries
    /// longer than one character.
    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        {
            let mut state = lock(&self.state);
            if state.query == query {
                return;
            }
            state.query.clone_from(&query);
        }

        if query.chars().count() > MIN_QUERY_CHARS {
            self.restart();
        } else {
            debug!(%query, "query too short, not searching");
        }
    }

    /// Start a search with the current inputs and return its surface.
    pub fn get_list(&self) -> StateSurface {
        self.restart();
        self.surface.clone()
    }

    pub fn query(&self) -> String {
        lock(&self.state).query.clone()
    }

    pub fn category(&self) -> Category {
        lock(&self.state).category
    }

    /// Position of the current category in [Category::ALL].
    pub fn category_position(&self) -> usize {
        let category = self.category();
        Category::ALL
            .iter()
            .position(|candidate| *candidate == category)
            .unwrap_or_default()
    }

    pub fn category_at(&self, position: usize) -> Option<Category> {
        Category::ALL.get(position).copied()
    }

    /// Titles of all categories, in position order.
    pub fn category_titles(&self) -> Vec<&'static str> {
        Category::ALL.iter().map(|category| category.title()).collect()
    }

    pub fn get_item(&self, position: usize) -> Option<Record> {
        self.surface.get_item(position)
    }

    pub fn get_count(&self) -> usize {
        self.surface.get_count()
    }

    /// Records merged by the running walk, not yet published.
    pub fn merged_count(&self) -> usize {
        lock(&self.state).accumulated.len()
    }

    pub fn surface(&self) -> &StateSurface {
        &self.surface
    }

    /// Abandon the running walk, if any.
    pub fn dispose(&self) {
        let state = lock(&self.state);
        state.scope.cancel();
        self.surface.set_loading(false);
    }

    fn restart(&self) {
        let (category, query, token) = {
            let mut state = lock(&self.state);
            let token = state.scope.renew();
            state.accumulated.clear();

            self.surface.publish_list(&state.accumulated);
            self.surface.set_error(false);
            self.surface.set_loading(true);
            (state.category, state.query.clone(), token)
        };

        let span = info_span!("search", %category, %query);
        let walk = run_search(
            Arc::clone(&self.client),
            Arc::clone(&self.state),
            self.surface.clone(),
            category,
            query,
            token,
        );
        tokio::spawn(walk.instrument(span));
    }
}

impl Drop for SearchOrchestrator {
    fn drop(&mut self) {
        self.dispose();
    }
}

async fn run_search(
    client: Arc<Client>,
    state: Arc<Mutex<SearchState>>,
    surface: StateSurface,
    category: Category,
    query: String,
    token: CancellationToken,
) {
    let pages = walk_pages(|page| {
        let client = Arc::clone(&client);
        let query = query.clone();
        async move { client.search_page(category, page, &query).await }
    });
    pin_mut!(pages);

    loop {
        let next = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!("search cancelled");
                return;
            },
            next = pages.next() => next,
        };

        let mut session = lock(&state);
        if token.is_cancelled() {
            debug!("discarding page of a cancelled search");
            return;
        }

        match next {
            Some(Ok(envelope)) => {
                session.accumulated.extend(envelope.results);
                debug!(merged = session.accumulated.len(), "merged search page");
            },
            Some(Err(err)) => {
                error!(%err, "search failed");
                session.accumulated.clear();
                surface.publish_list(&session.accumulated);
                surface.set_error(true);
                surface.set_loading(false);
                return;
            },
            None => {
                let ranked = rank(&session.accumulated, &query);
                session.accumulated.clear();
                session.accumulated.extend(ranked);
                debug!(count = session.accumulated.len(), "search complete");

                surface.publish_list(&session.accumulated);
                surface.set_loading(false);
                return;
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use holocron_catalog::types::Person;
    use holocron_catalog::{MockClient, MockRequest, StatusCode};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::utils::logging::test_helpers::test_subscriber;

    fn person(name: &str) -> Record {
        Record::Person(Person {
            name: name.to_string(),
            url: format!("https://swapi.dev/api/people/{}/", name.replace(' ', "-")),
            ..Default::default()
        })
    }

    fn page(names: &[&str], next: Option<u32>) -> Envelope<Record> {
        Envelope {
            count: None,
            next: next.map(|page| format!("https://swapi.dev/api/people/?search=x&page={page}")),
            previous: None,
            results: names.iter().map(|name| person(name)).collect(),
        }
    }

    fn names(surface: &StateSurface) -> Vec<String> {
        surface
            .list()
            .get()
            .iter()
            .map(|record| record.display_name().to_string())
            .collect()
    }

    fn search_request(page: u32, query: &str) -> MockRequest {
        MockRequest::Search {
            category: Category::People,
            page,
            query: query.to_string(),
        }
    }

    fn orchestrator(mock: &MockClient) -> SearchOrchestrator {
        SearchOrchestrator::new(Arc::new(Client::Mock(mock.clone())))
    }

    async fn requests_reach(mock: &MockClient, n: usize) {
        while mock.requests().len() < n {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn walk_stops_at_last_page() {
        let pages = walk_pages(|page| async move {
            let next = (page < 3).then_some(page + 1);
            Ok::<_, ()>(page_fixture(page, next))
        });
        let pages: Vec<_> = pages.collect().await;
        assert_eq!(pages.len(), 3);
        assert!(pages.iter().all(Result::is_ok));
    }

    #[tokio::test]
    async fn walk_ends_on_first_error() {
        let pages = walk_pages(|page| async move {
            if page == 2 {
                return Err("boom");
            }
            Ok(page_fixture(page, Some(page + 1)))
        });
        let pages: Vec<_> = pages.collect().await;
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1], Err("boom"));
    }

    fn page_fixture(page: u32, next: Option<u32>) -> Envelope<Record> {
        let name = format!("Page {page}");
        self::page(&[name.as_str()], next)
    }

    #[tokio::test]
    async fn all_pages_are_merged_and_ranked() {
        let mock = MockClient::default();
        mock.push_page(page(&["Darth Vader", "Anakin Skywalker"], Some(2)));
        mock.push_page(page(&[], Some(3)));
        mock.push_page(page(&["Skywalker", "Luke Skywalker"], None));
        let search = orchestrator(&mock);
        search.set_query_and_category("Skywalker", Category::People);
        assert_eq!(mock.requests(), vec![]);

        let surface = search.get_list();
        assert!(surface.is_loading().get());
        surface.settled().await;

        assert_eq!(names(&surface), vec![
            "Skywalker",
            "Luke Skywalker",
            "Anakin Skywalker",
            "Darth Vader",
        ]);
        assert_eq!(search.get_count(), 4);
        assert_eq!(search.merged_count(), 4);
        assert!(!surface.has_error().get());
        assert_eq!(mock.requests(), vec![
            search_request(1, "Skywalker"),
            search_request(2, "Skywalker"),
            search_request(3, "Skywalker"),
        ]);
    }

    #[tokio::test]
    async fn failure_on_any_page_clears_results() {
        let mock = MockClient::default();
        mock.push_page(page(&["Luke Skywalker"], Some(2)));
        mock.push_error(StatusCode::BAD_GATEWAY);
        mock.push_page(page(&["Anakin Skywalker"], None));
        let search = orchestrator(&mock);
        search.set_query_and_category("sky", Category::People);

        let surface = search.get_list();
        surface.settled().await;

        assert!(surface.has_error().get());
        assert_eq!(search.get_count(), 0);
        assert_eq!(search.merged_count(), 0);
        // the walk stops at the failed page
        assert_eq!(mock.requests().len(), 2);
        assert_eq!(mock.remaining(), 1);
    }

    #[tokio::test]
    async fn unchanged_or_short_query_does_not_search() {
        let mock = MockClient::default();
        let search = orchestrator(&mock);
        search.set_query_and_category("luke", Category::People);

        search.set_query("luke");
        search.set_query("l");
        tokio::task::yield_now().await;

        assert_eq!(search.query(), "l");
        assert_eq!(mock.requests(), vec![]);
        assert!(!search.surface().is_loading().get());
    }

    #[tokio::test]
    async fn new_query_supersedes_running_walk() {
        let mock = MockClient::default();
        mock.push_page(page(&["Darth Vader", "Darth Maul"], None));
        mock.pause();
        let search = orchestrator(&mock);
        search.set_query_and_category("sky", Category::People);

        let surface = search.get_list();
        requests_reach(&mock, 1).await;
        search.set_query("darth");
        requests_reach(&mock, 2).await;
        mock.resume();
        surface.settled().await;

        assert_eq!(names(&surface), vec!["Darth Maul", "Darth Vader"]);
        assert_eq!(mock.requests(), vec![
            search_request(1, "sky"),
            search_request(1, "darth"),
        ]);
        assert_eq!(mock.remaining(), 0);
    }

    #[tokio::test]
    async fn category_change_mid_walk_discards_stale_page() {
        let mock = MockClient::default();
        let vehicle = Record::Vehicle(holocron_catalog::types::Vehicle {
            name: "Snowspeeder".to_string(),
            url: "https://swapi.dev/api/vehicles/14/".to_string(),
            ..Default::default()
        });
        mock.push_page(Envelope {
            count: None,
            next: None,
            previous: None,
            results: vec![vehicle.clone()],
        });
        mock.pause();
        let search = orchestrator(&mock);
        search.set_query_and_category("speeder", Category::People);

        let surface = search.get_list();
        requests_reach(&mock, 1).await;
        search.set_category(Category::Vehicles);
        requests_reach(&mock, 2).await;
        mock.resume();
        surface.settled().await;

        assert_eq!(*surface.list().get(), vec![vehicle]);
        assert_eq!(mock.requests()[1], MockRequest::Search {
            category: Category::Vehicles,
            page: 1,
            query: "speeder".to_string(),
        });
        assert_eq!(mock.remaining(), 0);
    }

    #[tokio::test]
    async fn category_change_restarts_search() {
        let mock = MockClient::default();
        mock.push_page(page(&["Luke Skywalker"], None));
        let search = orchestrator(&mock);
        assert_eq!(search.category(), Category::Films);
        search.set_query_and_category("luke", Category::Films);

        search.set_category(Category::People);
        search.surface().settled().await;

        assert_eq!(search.category_position(), 1);
        assert_eq!(search.get_item(0), Some(person("Luke Skywalker")));
        assert_eq!(mock.requests(), vec![search_request(1, "luke")]);
    }

    #[tokio::test]
    async fn dispose_abandons_walk() {
        let mock = MockClient::default();
        mock.push_page(page(&["Yoda"], None));
        mock.pause();
        let search = orchestrator(&mock);
        search.set_query_and_category("yoda", Category::People);

        let surface = search.get_list();
        requests_reach(&mock, 1).await;
        search.dispose();
        assert!(!surface.is_loading().get());

        mock.resume();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(surface.get_count(), 0);
        assert_eq!(mock.remaining(), 1);
    }

    #[test]
    fn category_positions() {
        let search = orchestrator(&MockClient::default());
        assert_eq!(search.category_titles(), vec![
            "Films",
            "People",
            "Species",
            "Planets",
            "Starships",
            "Vehicles"
        ]);
        assert_eq!(search.category_at(3), Some(Category::Planets));
        assert_eq!(search.category_at(6), None);
        assert_eq!(search.category_position(), 0);
    }

    #[tokio::test]
    async fn progress_is_logged() {
        let (subscriber, writer) = test_subscriber();
        let _guard = tracing::subscriber::set_default(subscriber);

        let mock = MockClient::default();
        mock.push_page(page(&["Wedge Antilles"], Some(2)));
        mock.push_page(page(&["Biggs Darklighter"], None));
        let search = orchestrator(&mock);
        search.set_query_and_category("wedge", Category::People);

        search.get_list().settled().await;

        let logs = writer.to_string();
        assert!(logs.contains("merged search page merged=1"), "{logs}");
        assert!(logs.contains("merged search page merged=2"), "{logs}");
        assert!(logs.contains("search complete count=2"), "{logs}");
    }
}
