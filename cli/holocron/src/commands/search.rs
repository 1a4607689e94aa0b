use std::sync::Arc;

use anyhow::{Result, bail};
use bpaf::Bpaf;
use holocron_catalog::{Category, Client};
use holocron_sdk::models::search::SearchOrchestrator;
use holocron_sdk::models::state::RecordList;
use tracing::{debug, instrument};

use super::category;
use super::list::render_records;
use crate::utils::message;

// Search a category by name
#[derive(Debug, Bpaf, Clone)]
pub struct Search {
    /// Display search results as a JSON array
    #[bpaf(long)]
    pub json: bool,

    #[bpaf(external(category))]
    pub category: Category,

    /// Name or part of a name, e.g. 'skywalker'
    #[bpaf(positional("query"))]
    pub query: String,
}

impl Search {
    #[instrument(name = "search", fields(category = %self.category, query = self.query), skip_all)]
    pub async fn handle(self, client: Arc<Client>) -> Result<()> {
        let records = self.run(client).await?;
        debug!(count = records.len(), "search finished");

        if self.json {
            println!("{}", serde_json::to_string_pretty(&*records)?);
            return Ok(());
        }

        if records.is_empty() {
            message::plain(format!(
                "No {} match '{}'",
                self.category.title().to_lowercase(),
                self.query
            ));
            return Ok(());
        }

        print!("{}", render_records(&records));
        Ok(())
    }

    async fn run(&self, client: Arc<Client>) -> Result<RecordList> {
        let search = SearchOrchestrator::new(client);
        search.set_query_and_category(self.query.as_str(), self.category);

        let surface = search.get_list();
        surface.settled().await;

        if surface.has_error().get() {
            bail!("failed to search {}", self.category.title().to_lowercase());
        }
        Ok(surface.list().get())
    }
}

#[cfg(test)]
mod tests {
    use holocron_catalog::types::Starship;
    use holocron_catalog::{Envelope, MockClient, MockRequest, Record, StatusCode};
    use pretty_assertions::assert_eq;

    use super::*;

    fn starship(id: u32, name: &str) -> Record {
        Record::Starship(Starship {
            name: name.to_string(),
            url: format!("https://swapi.dev/api/starships/{id}/"),
            ..Default::default()
        })
    }

    fn search(query: &str) -> Search {
        Search {
            json: false,
            category: Category::Starships,
            query: query.to_string(),
        }
    }

    #[tokio::test]
    async fn results_are_ranked() {
        let mock = MockClient::default();
        mock.push_page(Envelope {
            count: Some(3),
            next: Some("https://swapi.dev/api/starships/?search=star&page=2".to_string()),
            previous: None,
            results: vec![starship(3, "Star Destroyer"), starship(9, "Death Star")],
        });
        mock.push_page(Envelope {
            count: Some(3),
            next: None,
            previous: None,
            results: vec![starship(59, "Star")],
        });

        let records = search("star")
            .run(Arc::new(Client::Mock(mock.clone())))
            .await
            .unwrap();

        let names: Vec<&str> = records.iter().map(Record::display_name).collect();
        assert_eq!(names, vec!["Star", "Star Destroyer", "Death Star"]);
        assert_eq!(mock.requests()[1], MockRequest::Search {
            category: Category::Starships,
            page: 2,
            query: "star".to_string(),
        });
    }

    #[tokio::test]
    async fn failed_search_is_an_error() {
        let mock = MockClient::default();
        mock.push_error(StatusCode::NOT_FOUND);

        let err = search("x-wing")
            .run(Arc::new(Client::Mock(mock)))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to search starships");
    }
}
