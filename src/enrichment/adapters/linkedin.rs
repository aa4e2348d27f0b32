// src/enrichment/adapters/linkedin.rs
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info};

use crate::enrichment::fetcher::PageFetcher;
use crate::enrichment::result::EnrichmentResult;
use crate::enrichment::search::SearchEngine;
use crate::errors::EnrichmentError;

pub const SOURCE_NAME: &str = "linkedin";

/// Finds a company's LinkedIn profile through a site-restricted search.
/// LinkedIn itself blocks anonymous scraping, so the profile URL, the
/// snippet description, and the headcount mention all come from the
/// search results page.
pub struct LinkedinAdapter {
    fetcher: Arc<dyn PageFetcher>,
    engine: SearchEngine,
    profile_regex: Regex,
    headcount_regex: Regex,
}

impl LinkedinAdapter {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            engine: SearchEngine::primary(),
            profile_regex: Regex::new(r"linkedin\.com/company/([A-Za-z0-9\-_.%]+)").unwrap(),
            headcount_regex: Regex::new(r"([\d,]+)\+?\s*(?:employees|followers)").unwrap(),
        }
    }

    pub async fn enrich(&self, company_name: &str) -> Result<EnrichmentResult, EnrichmentError> {
        let query = format!("site:linkedin.com/company \"{}\"", company_name);
        let html = self.fetcher.fetch(&self.engine.query_url(&query)).await?;

        let hits = self.engine.parse_results(&html);
        let profile_hit = hits
            .iter()
            .find_map(|hit| {
                self.profile_regex
                    .captures(&hit.url)
                    .and_then(|captures| captures.get(1))
                    .map(|slug| (hit, slug.as_str().trim_end_matches('/')))
            })
            .ok_or_else(|| {
                EnrichmentError::ParseMiss(format!("no company profile result for {}", company_name))
            })?;
        let (hit, slug) = profile_hit;

        let mut result = EnrichmentResult::tagged(SOURCE_NAME);
        result.linkedin_url = Some(format!("https://www.linkedin.com/company/{}", slug));
        result.description = snippet_description(&hit.snippet);
        result.num_employees = self
            .headcount_regex
            .captures(&hit.snippet)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().replace(',', ""));

        if result.num_employees.is_none() {
            debug!("no headcount mention in snippet for {}", company_name);
        }
        info!(
            "linkedin profile for {}: {}",
            company_name,
            result.linkedin_url.as_deref().unwrap_or("-")
        );
        Ok(result)
    }
}

/// LinkedIn snippets read "Acme | 12,345 followers on LinkedIn. <blurb>".
/// The trailing segment after the separator carries the blurb.
fn snippet_description(snippet: &str) -> Option<String> {
    let tail = snippet.rsplit('|').next()?.trim();
    let tail = tail
        .split_once("LinkedIn.")
        .map(|(_, rest)| rest.trim())
        .unwrap_or(tail);
    if tail.len() > 20 {
        Some(tail.to_string())
    } else {
        None
    }
}
