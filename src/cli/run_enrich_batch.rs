use dialoguer::{theme::ColorfulTheme, Confirm, Input};

use crate::database;
use crate::models::{CliApp, Result};

impl CliApp {
    pub async fn run_enrich_batch(&self) -> Result<()> {
        let pending = database::list_unenriched(&self.db_pool, i64::MAX as usize).await?;
        if pending.is_empty() {
            println!("\n✅ Nothing to do — every company is marked enriched.");
            return Ok(());
        }
        println!("\n{} companies pending enrichment.", pending.len());

        let limit: usize = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("How many to process this run")
            .default(10)
            .interact_text()?;

        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Enrich up to {} companies sequentially? This makes live web requests.",
                limit
            ))
            .default(true)
            .interact()?;
        if !confirmed {
            return Ok(());
        }

        let outcome = self.enricher.enrich_batch(limit).await?;

        println!("\n═══ Batch outcome ═══");
        println!("  Succeeded:       {}", outcome.succeeded.len());
        println!("  Target-complete: {}", outcome.completed);
        println!("  Failed:          {}", outcome.failed.len());
        for (company_id, reason) in &outcome.failed {
            println!("    - company {}: {}", company_id, reason);
        }

        Ok(())
    }
}
