use std::sync::Arc;

use anyhow::{Result, bail};
use bpaf::Bpaf;
use holocron_catalog::{Category, Client, Record};
use holocron_sdk::models::category::CategoryLoader;
use holocron_sdk::models::state::RecordList;
use holocron_sdk::utils::format::id_from_url;
use tracing::instrument;

use super::category;
use crate::utils::message;

// List the records of a category
#[derive(Debug, Bpaf, Clone)]
pub struct List {
    /// Load every page instead of only the first
    #[bpaf(short, long)]
    pub all: bool,

    /// Display the records as a JSON array
    #[bpaf(long)]
    pub json: bool,

    #[bpaf(external(category))]
    pub category: Category,
}

impl List {
    #[instrument(name = "list", fields(category = %self.category, all = self.all), skip_all)]
    pub async fn handle(self, client: Arc<Client>) -> Result<()> {
        let (records, more) = self.load(client).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&*records)?);
        } else {
            print!("{}", render_records(&records));
        }

        if more {
            message::plain("More records available, use '--all' to list every page");
        }
        Ok(())
    }

    /// Load the first page, or every page with `--all`.
    ///
    /// Also returns whether more pages are available.
    async fn load(&self, client: Arc<Client>) -> Result<(RecordList, bool)> {
        let loader = CategoryLoader::new(client);
        let surface = loader.open(self.category);
        surface.settled().await;

        while self.all && !surface.has_error().get() && loader.has_next_page() {
            loader.load_next_page();
            surface.settled().await;
        }

        if surface.has_error().get() {
            bail!(
                "failed to load {} after {} records",
                self.category.title().to_lowercase(),
                surface.get_count()
            );
        }

        Ok((surface.list().get(), loader.has_next_page()))
    }
}

/// One `id  name` line per record
pub(super) fn render_records(records: &[Record]) -> String {
    records
        .iter()
        .map(|record| {
            let id = id_from_url(record.url())
                .map(|id| id.to_string())
                .unwrap_or_default();
            format!("{id:>4}  {}\n", record.display_name())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use holocron_catalog::types::Person;
    use holocron_catalog::{Envelope, MockClient, StatusCode};
    use pretty_assertions::assert_eq;

    use super::*;

    fn person(id: u32, name: &str) -> Record {
        Record::Person(Person {
            name: name.to_string(),
            url: format!("https://swapi.dev/api/people/{id}/"),
            ..Default::default()
        })
    }

    fn page(results: Vec<Record>, next: Option<&str>) -> Envelope<Record> {
        Envelope {
            count: None,
            next: next.map(str::to_string),
            previous: None,
            results,
        }
    }

    fn list(all: bool) -> List {
        List {
            all,
            json: false,
            category: Category::People,
        }
    }

    fn seeded_mock() -> MockClient {
        let mock = MockClient::default();
        mock.push_page(page(
            vec![person(1, "Luke Skywalker"), person(2, "C-3PO")],
            Some("https://swapi.dev/api/people/?page=2"),
        ));
        mock.push_page(page(vec![person(3, "R2-D2")], None));
        mock
    }

    #[test]
    fn records_render_with_ids() {
        let rendered = render_records(&[person(1, "Luke Skywalker"), person(10, "Obi-Wan Kenobi")]);
        assert_eq!(rendered, "   1  Luke Skywalker\n  10  Obi-Wan Kenobi\n");
    }

    #[tokio::test]
    async fn first_page_only_by_default() {
        let mock = seeded_mock();
        let (records, more) = list(false)
            .load(Arc::new(Client::Mock(mock.clone())))
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert!(more);
        assert_eq!(mock.remaining(), 1);
    }

    #[tokio::test]
    async fn all_pages_with_flag() {
        let mock = seeded_mock();
        let (records, more) = list(true)
            .load(Arc::new(Client::Mock(mock.clone())))
            .await
            .unwrap();

        assert_eq!(*records, vec![
            person(1, "Luke Skywalker"),
            person(2, "C-3PO"),
            person(3, "R2-D2")
        ]);
        assert!(!more);
    }

    #[tokio::test]
    async fn failed_page_is_an_error() {
        let mock = MockClient::default();
        mock.push_page(page(
            vec![person(1, "Luke Skywalker")],
            Some("https://swapi.dev/api/people/?page=2"),
        ));
        mock.push_error(StatusCode::SERVICE_UNAVAILABLE);

        let err = list(true)
            .load(Arc::new(Client::Mock(mock)))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to load people after 1 records");
    }
}
