use dialoguer::{theme::ColorfulTheme, Select};

use crate::{
    cli::cli::MenuAction,
    models::{CliApp, Result},
};
use tracing::error;

impl CliApp {
    pub async fn run(&self) -> Result<()> {
        println!("\n🏢 Welcome to Company Enricher!");
        println!("═══════════════════════════════════════");

        // Show initial stats
        self.show_database_stats().await?;

        loop {
            let actions = vec![
                MenuAction::EnrichCompany,
                MenuAction::EnrichBatch,
                MenuAction::QuickEnrichUrl,
                MenuAction::ExtractFromText,
                MenuAction::ResetEnrichment,
                MenuAction::ExportCompanies,
                MenuAction::ShowStats,
                MenuAction::Exit,
            ];

            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("\nSelect an action")
                .default(0)
                .items(&actions)
                .interact()?;

            match &actions[selection] {
                MenuAction::EnrichCompany => {
                    if let Err(e) = self.run_enrich_company().await {
                        error!("Enrichment failed: {}", e);
                    }
                }
                MenuAction::EnrichBatch => {
                    if let Err(e) = self.run_enrich_batch().await {
                        error!("Batch enrichment failed: {}", e);
                    }
                }
                MenuAction::QuickEnrichUrl => {
                    if let Err(e) = self.run_quick_enrich().await {
                        error!("Quick enrichment failed: {}", e);
                    }
                }
                MenuAction::ExtractFromText => {
                    if let Err(e) = self.run_extract_text().await {
                        error!("Text extraction failed: {}", e);
                    }
                }
                MenuAction::ResetEnrichment => {
                    if let Err(e) = self.run_reset_enrichment().await {
                        error!("Reset failed: {}", e);
                    }
                }
                MenuAction::ExportCompanies => {
                    if let Err(e) = self.run_export_companies().await {
                        error!("Export failed: {}", e);
                    }
                }
                MenuAction::ShowStats => {
                    if let Err(e) = self.show_database_stats().await {
                        error!("Failed to show stats: {}", e);
                    }
                }
                MenuAction::Exit => {
                    println!("\n👋 Thanks for using Company Enricher!");
                    break;
                }
            }
        }

        Ok(())
    }
}
