// src/enrichment/adapters/wikipedia.rs
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::{debug, info};

use crate::enrichment::fetcher::PageFetcher;
use crate::enrichment::result::EnrichmentResult;
use crate::errors::EnrichmentError;

pub const SOURCE_NAME: &str = "wikipedia";

const API_BASE: &str = "https://en.wikipedia.org/w/api.php";
const PAGE_BASE: &str = "https://en.wikipedia.org/wiki/";

const INTRO_SENTENCES: usize = 3;
const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Infobox row labels worth lifting, matched by prefix against the
/// lowercased `<th>` text.
static INFOBOX_FIELDS: &[(&str, fn(&mut EnrichmentResult) -> &mut Option<String>)] = &[
    ("industry", |r| &mut r.industry),
    ("founded", |r| &mut r.founded),
    ("headquarters", |r| &mut r.headquarters),
    ("number of employees", |r| &mut r.num_employees),
    ("website", |r| &mut r.website),
];

/// Pulls the article intro and the structured infobox for a company.
/// Three fetches: search API, extracts API, rendered page — each one
/// optional after the first.
pub struct WikipediaAdapter {
    fetcher: Arc<dyn PageFetcher>,
}

impl WikipediaAdapter {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn enrich(&self, company_name: &str) -> Result<EnrichmentResult, EnrichmentError> {
        let title = self.search_best_title(company_name).await?;
        let mut result = EnrichmentResult::tagged(SOURCE_NAME);

        match self.fetch_intro(&title).await {
            Ok(Some(intro)) => result.description = Some(intro),
            Ok(None) => debug!("no extract for article {}", title),
            Err(e) => debug!("intro fetch failed for {}: {}", title, e),
        }

        let page_url = format!(
            "{}{}",
            PAGE_BASE,
            encode_component(&title.replace(' ', "_"))
        );
        match self.fetcher.fetch(&page_url).await {
            Ok(html) => parse_infobox(&html, &mut result),
            Err(e) => debug!("article fetch failed for {}: {}", title, e),
        }

        info!(
            "wikipedia enrichment for {} via article {:?}",
            company_name, title
        );
        Ok(result)
    }

    async fn search_best_title(&self, company_name: &str) -> Result<String, EnrichmentError> {
        let url = format!(
            "{}?action=query&list=search&format=json&srlimit=5&srsearch={}",
            API_BASE,
            encode_component(&format!("{} company", company_name))
        );
        let body = self.fetcher.fetch(&url).await?;
        let json: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| EnrichmentError::ParseMiss(format!("search response not JSON: {}", e)))?;

        let titles: Vec<String> = json["query"]["search"]
            .as_array()
            .map(|results| {
                results
                    .iter()
                    .filter_map(|entry| entry["title"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        best_title_match(&titles, company_name)
            .ok_or_else(|| EnrichmentError::ParseMiss(format!("no article for {}", company_name)))
    }

    async fn fetch_intro(&self, title: &str) -> Result<Option<String>, EnrichmentError> {
        let url = format!(
            "{}?action=query&prop=extracts&exintro=1&explaintext=1&format=json&titles={}",
            API_BASE,
            encode_component(title)
        );
        let body = self.fetcher.fetch(&url).await?;
        let json: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| EnrichmentError::ParseMiss(format!("extract response not JSON: {}", e)))?;

        let intro = json["query"]["pages"]
            .as_object()
            .and_then(|pages| pages.values().next())
            .and_then(|page| page["extract"].as_str())
            .map(|extract| leading_sentences(extract, INTRO_SENTENCES))
            .filter(|intro| !intro.is_empty());
        Ok(intro)
    }
}

/// Case-insensitive exact match first, then substring either way, then
/// the engine's own ranking.
fn best_title_match(titles: &[String], company_name: &str) -> Option<String> {
    let needle = company_name.to_lowercase();
    if let Some(exact) = titles.iter().find(|t| t.to_lowercase() == needle) {
        return Some(exact.clone());
    }
    if let Some(close) = titles.iter().find(|t| {
        let title = t.to_lowercase();
        title.contains(&needle) || needle.contains(&title)
    }) {
        return Some(close.clone());
    }
    titles.first().cloned()
}

fn leading_sentences(text: &str, count: usize) -> String {
    let joined: String = text.split_inclusive(". ").take(count).collect();
    let trimmed = joined.trim();
    trimmed.chars().take(MAX_DESCRIPTION_LENGTH).collect()
}

fn parse_infobox(html: &str, result: &mut EnrichmentResult) {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("table.infobox tr").unwrap();
    let label_selector = Selector::parse("th").unwrap();
    let value_selector = Selector::parse("td").unwrap();

    for row in document.select(&row_selector) {
        let Some(label_el) = row.select(&label_selector).next() else {
            continue;
        };
        let Some(value_el) = row.select(&value_selector).next() else {
            continue;
        };

        let label = label_el
            .text()
            .collect::<String>()
            .trim()
            .to_lowercase();
        let value = value_el
            .text()
            .collect::<Vec<_>>()
            .join(" ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if value.is_empty() {
            continue;
        }

        for (prefix, slot_of) in INFOBOX_FIELDS {
            if label.starts_with(prefix) {
                let slot = slot_of(result);
                if slot.is_none() {
                    *slot = Some(value.clone());
                }
                break;
            }
        }
    }
}

fn encode_component(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}
