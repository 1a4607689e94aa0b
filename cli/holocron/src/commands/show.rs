use std::sync::Arc;

use anyhow::{Context, Result};
use bpaf::Bpaf;
use holocron_catalog::{Category, Client, ClientTrait, Record};
use holocron_sdk::utils::format::describe;
use tracing::instrument;

use super::category;

// Show the details of a single record
#[derive(Debug, Bpaf, Clone)]
pub struct Show {
    /// Display the record as JSON
    #[bpaf(long)]
    pub json: bool,

    #[bpaf(external(category))]
    pub category: Category,

    /// Numeric id of the record, as shown by 'holocron list'
    #[bpaf(positional("id"))]
    pub id: u32,
}

impl Show {
    #[instrument(name = "show", fields(category = %self.category, id = self.id), skip_all)]
    pub async fn handle(self, client: Arc<Client>) -> Result<()> {
        let record = client
            .fetch_record(self.category, self.id)
            .await
            .with_context(|| {
                format!(
                    "could not fetch {} {}",
                    self.category.title().to_lowercase(),
                    self.id
                )
            })?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&record)?);
        } else {
            print!("{}", render_details(&record));
        }
        Ok(())
    }
}

/// The record name followed by aligned `label  value` rows
fn render_details(record: &Record) -> String {
    let rows = describe(record);
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);

    let mut rendered = format!("{}\n", record.display_name());
    for (label, value) in rows {
        rendered.push_str(&format!("  {label:<width$}  {value}\n"));
    }
    rendered
}
