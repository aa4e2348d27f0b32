use chrono::Utc;
use serde::Serialize;

use crate::database::{self, CompanyRecord, StoredContact};
use crate::models::{CliApp, Result};

#[derive(Serialize)]
struct CompanyExport {
    #[serde(flatten)]
    company: CompanyRecord,
    contacts: Vec<StoredContact>,
}

#[derive(Serialize)]
struct ExportFile {
    exported_at: String,
    total_companies: usize,
    companies: Vec<CompanyExport>,
}

impl CliApp {
    pub async fn run_export_companies(&self) -> Result<()> {
        let companies = database::list_enriched(&self.db_pool).await?;
        if companies.is_empty() {
            println!("\nNo enriched companies to export yet.");
            return Ok(());
        }

        let mut exports = Vec::with_capacity(companies.len());
        for company in companies {
            let contacts = database::get_contacts(&self.db_pool, company.id).await?;
            exports.push(CompanyExport { company, contacts });
        }

        let file = ExportFile {
            exported_at: Utc::now().to_rfc3339(),
            total_companies: exports.len(),
            companies: exports,
        };

        let json = if self.config.output.pretty_json {
            serde_json::to_string_pretty(&file)?
        } else {
            serde_json::to_string(&file)?
        };

        let path = format!(
            "{}/companies_export_{}.json",
            self.config.output.directory,
            Utc::now().format("%Y%m%d_%H%M%S")
        );
        tokio::fs::write(&path, json).await?;

        println!(
            "\n📤 Exported {} companies to {}",
            file.total_companies, path
        );
        Ok(())
    }
}
