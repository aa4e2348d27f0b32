use crate::database;
use crate::models::{CliApp, Result};

impl CliApp {
    pub async fn show_database_stats(&self) -> Result<()> {
        let stats = database::get_database_stats(&self.db_pool).await?;

        println!("\n📊 Database statistics");
        println!("───────────────────────────────");
        println!("  Companies:  {}", stats.total_companies);
        println!(
            "  Enriched:   {} ({:.1}%)",
            stats.enriched_companies, stats.enrichment_rate
        );
        println!("  Contacts:   {}", stats.total_contacts);

        Ok(())
    }
}
