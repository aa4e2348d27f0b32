// src/enrichment/orchestrator.rs
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::EnrichmentConfig;
use crate::database::{self, CompanyRecord, DbPool, StoredContact};
use crate::email_extractor::{ContactDraft, ContactKind, ContactPriority, EmailExtractor};
use crate::enrichment::adapters::linkedin::LinkedinAdapter;
use crate::enrichment::adapters::web_search::WebSearchAdapter;
use crate::enrichment::adapters::website::WebsiteAdapter;
use crate::enrichment::adapters::wikipedia::WikipediaAdapter;
use crate::enrichment::fetcher::{HttpPageFetcher, PageFetcher};
use crate::enrichment::resolver::WebsiteResolver;
use crate::enrichment::result::EnrichmentResult;
use crate::errors::EnrichmentError;

/// Source tag for the resolution step, distinct from the adapter that
/// then scrapes the resolved site.
pub const RESOLUTION_SOURCE: &str = "website_resolution";
/// Source tag for the waterfall-free text path.
pub const TEXT_SOURCE: &str = "job_description";

#[derive(Debug, Serialize)]
pub struct EnrichmentReport {
    pub company_id: i64,
    pub company_name: String,
    pub result: EnrichmentResult,
    pub target_complete: bool,
    pub sources: Vec<String>,
    pub fields_written: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct BatchOutcome {
    pub succeeded: Vec<i64>,
    pub failed: Vec<(i64, String)>,
    /// How many of the succeeded runs ended target-complete.
    pub completed: usize,
}

/// Runs the source waterfall for one company at a time and writes the
/// merged result back. Sources are consulted in a fixed order and the
/// run short-circuits the moment the four target fields are covered.
pub struct CompanyEnricher {
    db: Option<DbPool>,
    config: EnrichmentConfig,
    extractor: EmailExtractor,
    resolver: WebsiteResolver,
    website: WebsiteAdapter,
    linkedin: LinkedinAdapter,
    wikipedia: WikipediaAdapter,
    web_search: WebSearchAdapter,
}

impl CompanyEnricher {
    pub fn new(config: EnrichmentConfig, db: Option<DbPool>) -> Self {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpPageFetcher::new(
            Duration::from_secs(config.request_timeout_seconds),
            &config.user_agent,
        ));
        Self::with_fetcher(config, db, fetcher)
    }

    /// Seam for tests and alternative transports.
    pub fn with_fetcher(
        config: EnrichmentConfig,
        db: Option<DbPool>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        let extractor = EmailExtractor::new();
        Self {
            db,
            config,
            extractor: extractor.clone(),
            resolver: WebsiteResolver::new(fetcher.clone()),
            website: WebsiteAdapter::new(fetcher.clone(), extractor),
            linkedin: LinkedinAdapter::new(fetcher.clone()),
            wikipedia: WikipediaAdapter::new(fetcher.clone()),
            web_search: WebSearchAdapter::new(fetcher),
        }
    }

    /// Full enrichment of a stored company: waterfall, merge, write-back.
    pub async fn enrich_company(
        &self,
        company_id: i64,
    ) -> Result<EnrichmentReport, EnrichmentError> {
        let pool = self.db.as_ref().ok_or(EnrichmentError::MissingStorage)?;
        let company = database::get_company(pool, company_id)
            .await?
            .ok_or(EnrichmentError::CompanyNotFound(company_id))?;
        let existing_contacts = database::get_contacts(pool, company_id).await?;

        info!("enriching company {} ({})", company.name, company.id);
        let mut accumulator = seed_accumulator(&company, &existing_contacts);
        self.run_waterfall(&mut accumulator, &company.name).await;

        let fields_written = database::persist_enrichment(pool, company_id, &accumulator).await?;
        let target_complete = accumulator.target_complete();
        info!(
            "company {} enriched: complete={}, sources={:?}, wrote={:?}",
            company.name, target_complete, accumulator.sources, fields_written
        );

        Ok(EnrichmentReport {
            company_id,
            company_name: company.name,
            target_complete,
            sources: accumulator.sources.clone(),
            fields_written,
            result: accumulator,
        })
    }

    /// The fixed source order. Before every step the stopping condition
    /// is rechecked, so a record that is already covered costs zero
    /// external calls.
    async fn run_waterfall(&self, accumulator: &mut EnrichmentResult, company_name: &str) {
        if accumulator.target_complete() {
            debug!("{} already target-complete, skipping all sources", company_name);
            return;
        }

        let website = match accumulator.website.clone() {
            Some(url) => Some(url),
            None => {
                let resolved = self.resolver.resolve(company_name).await;
                if let Some(url) = &resolved {
                    accumulator.push_source(RESOLUTION_SOURCE);
                    accumulator.website = Some(url.clone());
                }
                resolved
            }
        };
        if let Some(url) = website {
            let outcome = self.website.enrich(&url).await;
            apply_step(accumulator, crate::enrichment::adapters::website::SOURCE_NAME, outcome);
        }

        if accumulator.target_complete() {
            return;
        }
        let outcome = self.linkedin.enrich(company_name).await;
        apply_step(accumulator, crate::enrichment::adapters::linkedin::SOURCE_NAME, outcome);

        if accumulator.target_complete() {
            return;
        }
        let outcome = self.wikipedia.enrich(company_name).await;
        apply_step(accumulator, crate::enrichment::adapters::wikipedia::SOURCE_NAME, outcome);

        if accumulator.target_complete() {
            return;
        }
        let outcome = self.web_search.enrich(company_name).await;
        apply_step(accumulator, crate::enrichment::adapters::web_search::SOURCE_NAME, outcome);
    }

    /// Waterfall-free path over free text (job descriptions). Does not
    /// mark the company as enriched.
    pub fn extract_from_text(&self, text: &str, company_name: Option<&str>) -> EnrichmentResult {
        let mut result = EnrichmentResult::tagged(TEXT_SOURCE);
        let mut drafts = self.extractor.extract_emails_with_context(text);
        if let Some(name) = company_name {
            drafts = self.extractor.rank_for_company(drafts, name);
        }
        for draft in drafts {
            result.push_contact(draft);
        }
        result
    }

    /// Text path with persistence: contacts land in storage, the
    /// company's enrichment status is untouched.
    pub async fn enrich_company_from_text(
        &self,
        company_id: i64,
        text: &str,
    ) -> Result<EnrichmentResult, EnrichmentError> {
        let pool = self.db.as_ref().ok_or(EnrichmentError::MissingStorage)?;
        let company = database::get_company(pool, company_id)
            .await?
            .ok_or(EnrichmentError::CompanyNotFound(company_id))?;

        let result = self.extract_from_text(text, Some(&company.name));
        let inserted = database::persist_contacts(pool, company_id, &result.contacts).await?;
        info!(
            "text enrichment for {}: {} contacts ({} new)",
            company.name,
            result.contacts.len(),
            inserted
        );
        Ok(result)
    }

    /// Storage-free single-site enrichment for previews. Failures
    /// collapse into an empty tagged result.
    pub async fn enrich_from_website(&self, website_url: &str) -> EnrichmentResult {
        match self.website.enrich(website_url).await {
            Ok(result) => result,
            Err(e) => {
                debug!("website preview failed for {}: {}", website_url, e);
                EnrichmentResult::tagged(crate::enrichment::adapters::website::SOURCE_NAME)
            }
        }
    }

    /// One company fully, then the next; a polite jittered pause in
    /// between. A failing company is recorded and skipped, never fatal.
    pub async fn enrich_batch(&self, limit: usize) -> Result<BatchOutcome, EnrichmentError> {
        let pool = self.db.as_ref().ok_or(EnrichmentError::MissingStorage)?;
        let pending = database::list_unenriched(pool, limit).await?;
        info!("batch enrichment: {} companies pending", pending.len());

        let mut outcome = BatchOutcome::default();
        for (index, company) in pending.iter().enumerate() {
            match self.enrich_company(company.id).await {
                Ok(report) => {
                    if report.target_complete {
                        outcome.completed += 1;
                    }
                    outcome.succeeded.push(company.id);
                }
                Err(e) => {
                    error!("enrichment failed for {} ({}): {}", company.name, company.id, e);
                    outcome.failed.push((company.id, e.to_string()));
                }
            }

            if index + 1 < pending.len() {
                let jitter = fastrand::u64(0..=500);
                tokio::time::sleep(Duration::from_millis(self.config.batch_delay_ms + jitter))
                    .await;
            }
        }

        info!(
            "batch done: {} succeeded ({} complete), {} failed",
            outcome.succeeded.len(),
            outcome.completed,
            outcome.failed.len()
        );
        Ok(outcome)
    }

    /// The explicit retry mechanism: clears the attempted-once marker.
    pub async fn reset_enrichment(&self, company_id: i64) -> Result<(), EnrichmentError> {
        let pool = self.db.as_ref().ok_or(EnrichmentError::MissingStorage)?;
        if !database::reset_enrichment(pool, company_id).await? {
            return Err(EnrichmentError::CompanyNotFound(company_id));
        }
        Ok(())
    }
}

/// Start the accumulator from what storage already knows, so earlier
/// runs and manual edits outrank every scraped source.
fn seed_accumulator(company: &CompanyRecord, contacts: &[StoredContact]) -> EnrichmentResult {
    let mut accumulator = EnrichmentResult::new();
    accumulator.website = blank_to_none(&company.website);
    accumulator.description = blank_to_none(&company.description);
    accumulator.linkedin_url = blank_to_none(&company.linkedin_url);
    accumulator.glassdoor_url = blank_to_none(&company.glassdoor_url);
    accumulator.industry = blank_to_none(&company.industry);
    accumulator.num_employees = blank_to_none(&company.num_employees);
    for contact in contacts {
        accumulator.push_contact(ContactDraft {
            email: contact.email.clone(),
            kind: contact
                .position
                .as_deref()
                .map(ContactKind::from_label)
                .unwrap_or(ContactKind::Unknown),
            context: contact.notes.clone().unwrap_or_default(),
            priority: ContactPriority::Low,
        });
    }
    accumulator
}

fn blank_to_none(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Collapse a failed source into "contributed nothing": the failure is
/// logged, the source still shows up as consulted, and the waterfall
/// moves on.
fn apply_step(
    accumulator: &mut EnrichmentResult,
    source: &str,
    outcome: Result<EnrichmentResult, EnrichmentError>,
) {
    match outcome {
        Ok(partial) => accumulator.merge(partial),
        Err(e) => {
            if e.is_transient() {
                debug!("source {} contributed nothing: {}", source, e);
            } else {
                warn!("source {} failed unexpectedly: {}", source, e);
            }
            accumulator.push_source(source);
        }
    }
}
