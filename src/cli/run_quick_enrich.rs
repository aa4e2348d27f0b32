use dialoguer::{theme::ColorfulTheme, Input};

use crate::models::{CliApp, Result};

impl CliApp {
    /// Scrape a single site without touching storage — handy for checking
    /// what a company's pages yield before committing a record.
    pub async fn run_quick_enrich(&self) -> Result<()> {
        let url: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Website URL")
            .interact_text()?;
        let url = url.trim().to_string();
        if url.is_empty() {
            return Ok(());
        }

        println!("\n⚡ Scraping {}...", url);
        let result = self.enricher.enrich_from_website(&url).await;

        println!("\n═══ Quick enrichment ═══");
        println!("  Website:   {}", result.website.as_deref().unwrap_or("-"));
        println!(
            "  LinkedIn:  {}",
            result.linkedin_url.as_deref().unwrap_or("-")
        );
        println!(
            "  Careers:   {}",
            result.careers_url.as_deref().unwrap_or("-")
        );
        println!("  Phone:     {}", result.phone.as_deref().unwrap_or("-"));
        if let Some(description) = &result.description {
            let preview: String = description.chars().take(200).collect();
            println!("  Description: {}...", preview);
        }
        println!("  Emails found: {}", result.emails.len());
        for contact in &result.contacts {
            println!("    - {} ({})", contact.email, contact.kind);
        }

        Ok(())
    }
}
