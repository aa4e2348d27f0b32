use dialoguer::{theme::ColorfulTheme, Confirm, Input};

use crate::database;
use crate::models::{CliApp, Result};

impl CliApp {
    pub async fn run_reset_enrichment(&self) -> Result<()> {
        let name: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Company name")
            .interact_text()?;
        let name = name.trim().to_string();
        if name.is_empty() {
            return Ok(());
        }

        let company = database::find_or_create_company(&self.db_pool, &name).await?;
        if !company.is_enriched {
            println!("\n{} is not marked enriched; nothing to reset.", company.name);
            return Ok(());
        }

        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Clear enrichment status for {} so the next run re-scrapes it?",
                company.name
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            return Ok(());
        }

        self.enricher.reset_enrichment(company.id).await?;
        println!("♻️  {} is pending enrichment again.", company.name);
        Ok(())
    }
}
