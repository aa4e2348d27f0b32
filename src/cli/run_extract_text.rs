use dialoguer::{theme::ColorfulTheme, Confirm, Input};

use crate::database;
use crate::models::{CliApp, Result};

impl CliApp {
    /// The lightweight path: pull contacts out of pasted text (a job
    /// description, an email thread) without running the waterfall.
    pub async fn run_extract_text(&self) -> Result<()> {
        let text: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Paste the text to scan")
            .interact_text()?;
        if text.trim().is_empty() {
            return Ok(());
        }

        let company_name: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Company name (optional, ranks matching domains first)")
            .allow_empty(true)
            .interact_text()?;
        let company_name = company_name.trim().to_string();

        let result = self.enricher.extract_from_text(
            &text,
            if company_name.is_empty() {
                None
            } else {
                Some(&company_name)
            },
        );

        if result.contacts.is_empty() {
            println!("\nNo usable email addresses found.");
            return Ok(());
        }

        println!("\n═══ Extracted contacts ═══");
        for contact in &result.contacts {
            println!(
                "  - {} ({}, priority {:?})",
                contact.email, contact.kind, contact.priority
            );
        }

        if company_name.is_empty() {
            return Ok(());
        }
        let save = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Save these contacts under \"{}\"?", company_name))
            .default(false)
            .interact()?;
        if save {
            let company = database::find_or_create_company(&self.db_pool, &company_name).await?;
            let inserted =
                database::persist_contacts(&self.db_pool, company.id, &result.contacts).await?;
            println!("💾 Saved {} new contact(s) for {}.", inserted, company.name);
        }

        Ok(())
    }
}
