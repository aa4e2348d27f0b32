use dialoguer::{theme::ColorfulTheme, Input};

use crate::database;
use crate::models::{CliApp, Result};

impl CliApp {
    pub async fn run_enrich_company(&self) -> Result<()> {
        let name: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Company name")
            .interact_text()?;
        let name = name.trim().to_string();
        if name.is_empty() {
            println!("No company name given.");
            return Ok(());
        }

        let company = database::find_or_create_company(&self.db_pool, &name).await?;
        if company.is_enriched {
            println!(
                "\n⚠️  {} was already enriched at {:?} — reset it first to run again.",
                company.name, company.enriched_at
            );
            return Ok(());
        }

        println!("\n🔍 Enriching {} (id {})...", company.name, company.id);
        let report = self.enricher.enrich_company(company.id).await?;

        println!("\n═══ Enrichment result ═══");
        println!(
            "  Complete:    {}",
            if report.target_complete { "✅ yes" } else { "❌ no" }
        );
        println!("  Sources:     {}", report.sources.join(" → "));
        println!(
            "  Website:     {}",
            report.result.website.as_deref().unwrap_or("-")
        );
        println!(
            "  LinkedIn:    {}",
            report.result.linkedin_url.as_deref().unwrap_or("-")
        );
        if let Some(description) = &report.result.description {
            let preview: String = description.chars().take(160).collect();
            println!("  Description: {}...", preview);
        }
        println!("  Emails:      {}", report.result.emails.len());
        for contact in &report.result.contacts {
            println!("    - {} ({})", contact.email, contact.kind);
        }
        println!("  Fields written: {:?}", report.fields_written);
        println!(
            "  Completeness:   {:.0}%",
            report.result.completeness_score() * 100.0
        );

        Ok(())
    }
}
