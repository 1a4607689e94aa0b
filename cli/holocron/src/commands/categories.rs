use anyhow::Result;
use bpaf::Bpaf;
use holocron_catalog::Category;

/// List the catalog categories
#[derive(Debug, Bpaf, Clone)]
pub struct Categories {}

impl Categories {
    pub fn handle(self) -> Result<()> {
        print!("{}", render_categories());
        Ok(())
    }
}

fn render_categories() -> String {
    Category::ALL
        .iter()
        .map(|category| format!("{:<10} {}\n", category.endpoint(), category.title()))
        .collect()
}
