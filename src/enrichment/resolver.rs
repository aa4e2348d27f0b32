// src/enrichment/resolver.rs
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

use crate::enrichment::fetcher::PageFetcher;
use crate::enrichment::search::SearchEngine;

/// Phrases that give away a parked or for-sale placeholder page.
const PARKED_PAGE_PHRASES: &[&str] = &[
    "domain is for sale",
    "this domain may be for sale",
    "buy this domain",
    "purchase this domain",
    "domain parking",
    "parked domain",
    "is parked free",
    "hugedomains",
    "sedo.com",
    "godaddy auctions",
];

/// Hosts that a search for a company's own site must never resolve to:
/// aggregators, social platforms, and the engines themselves.
const SEARCH_DENYLIST: &[&str] = &[
    "linkedin.com",
    "facebook.com",
    "twitter.com",
    "x.com",
    "instagram.com",
    "youtube.com",
    "wikipedia.org",
    "glassdoor.com",
    "indeed.com",
    "crunchbase.com",
    "bloomberg.com",
    "zoominfo.com",
    "yelp.com",
    "reddit.com",
    "medium.com",
    "bing.com",
    "duckduckgo.com",
    "google.com",
];

/// Guesses a company's canonical website: a fixed set of domain guesses
/// verified against the live page, then two search engines as fallback.
pub struct WebsiteResolver {
    fetcher: Arc<dyn PageFetcher>,
    primary: SearchEngine,
    secondary: SearchEngine,
}

impl WebsiteResolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            primary: SearchEngine::primary(),
            secondary: SearchEngine::secondary(),
        }
    }

    /// Fixed order, first success wins. Worst case issues one fetch per
    /// domain guess plus one per engine.
    pub async fn resolve(&self, company_name: &str) -> Option<String> {
        if let Some(url) = self.resolve_by_guessing(company_name).await {
            info!("resolved {} by domain guess: {}", company_name, url);
            return Some(url);
        }
        if let Some(url) = self.resolve_by_search(&self.primary, company_name).await {
            info!(
                "resolved {} via {} search: {}",
                company_name, self.primary.name, url
            );
            return Some(url);
        }
        if let Some(url) = self.resolve_by_search(&self.secondary, company_name).await {
            info!(
                "resolved {} via {} search: {}",
                company_name, self.secondary.name, url
            );
            return Some(url);
        }
        debug!("no website resolved for {}", company_name);
        None
    }

    async fn resolve_by_guessing(&self, company_name: &str) -> Option<String> {
        let normalized: String = company_name
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        if normalized.is_empty() {
            return None;
        }

        for domain in candidate_domains(&normalized) {
            let guess = format!("https://{}", domain);
            match self.fetcher.fetch(&guess).await {
                Ok(body) => {
                    if verify_company_page(&body, company_name) {
                        return normalize_site_url(&guess);
                    }
                    debug!("guess {} responded but failed verification", guess);
                }
                Err(e) => debug!("guess {} rejected: {}", guess, e),
            }
        }
        None
    }

    async fn resolve_by_search(&self, engine: &SearchEngine, company_name: &str) -> Option<String> {
        let query = format!("{} official website", company_name);
        let html = match self.fetcher.fetch(&engine.query_url(&query)).await {
            Ok(html) => html,
            Err(e) => {
                debug!("{} search failed for {}: {}", engine.name, company_name, e);
                return None;
            }
        };

        engine
            .parse_results(&html)
            .iter()
            .find_map(|hit| accept_search_candidate(&hit.url))
    }
}

fn candidate_domains(normalized: &str) -> Vec<String> {
    vec![
        format!("{}.com", normalized),
        format!("www.{}.com", normalized),
        format!("{}.io", normalized),
        format!("{}.co", normalized),
        format!("{}inc.com", normalized),
        format!("{}hq.com", normalized),
        format!("get{}.com", normalized),
    ]
}

/// A guessed domain counts only if the page is not a parked placeholder
/// and actually mentions the company.
fn verify_company_page(body: &str, company_name: &str) -> bool {
    let body_lower = body.to_lowercase();
    if PARKED_PAGE_PHRASES
        .iter()
        .any(|phrase| body_lower.contains(phrase))
    {
        return false;
    }
    body_lower.contains(&company_name.to_lowercase())
}

fn accept_search_candidate(candidate: &str) -> Option<String> {
    let parsed = Url::parse(candidate).ok()?;
    let host = parsed.host_str()?;
    if is_denylisted(host) {
        return None;
    }
    Some(format!("{}://{}", parsed.scheme(), host))
}

fn is_denylisted(host: &str) -> bool {
    SEARCH_DENYLIST
        .iter()
        .any(|denied| host == *denied || host.ends_with(&format!(".{}", denied)))
}

/// Strip a URL down to `scheme://host`, adding https where the scheme is
/// missing.
pub fn normalize_site_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    let parsed = Url::parse(&with_scheme).ok()?;
    let host = parsed.host_str()?;
    Some(format!("{}://{}", parsed.scheme(), host))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EnrichmentError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CannedFetcher {
        pages: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl CannedFetcher {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, body)| (url.to_string(), body.to_string()))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for CannedFetcher {
        async fn fetch(&self, url: &str) -> Result<String, EnrichmentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| EnrichmentError::fetch(url, "HTTP 404 Not Found"))
        }
    }

    #[tokio::test]
    async fn first_verified_guess_wins() {
        let fetcher = Arc::new(CannedFetcher::new(&[(
            "https://acme.io",
            "<html><title>Acme</title><body>Acme builds rockets</body></html>",
        )]));
        let resolver = WebsiteResolver::new(fetcher);
        assert_eq!(
            resolver.resolve("Acme").await.as_deref(),
            Some("https://acme.io")
        );
    }

    #[tokio::test]
    async fn parked_pages_are_rejected() {
        let fetcher = Arc::new(CannedFetcher::new(&[(
            "https://acme.com",
            "<html><body>Acme — this domain may be for sale at auction</body></html>",
        )]));
        let resolver = WebsiteResolver::new(fetcher);
        assert_eq!(resolver.resolve("Acme").await, None);
    }

    #[tokio::test]
    async fn pages_not_mentioning_the_company_are_rejected() {
        let fetcher = Arc::new(CannedFetcher::new(&[(
            "https://acme.com",
            "<html><body>Totally unrelated storefront</body></html>",
        )]));
        let resolver = WebsiteResolver::new(fetcher);
        assert_eq!(resolver.resolve("Acme").await, None);
    }

    #[tokio::test]
    async fn falls_back_to_search_and_filters_denylist() {
        let results = r#"
            <li class="b_algo"><h2><a href="https://www.linkedin.com/company/acme">Acme | LinkedIn</a></h2></li>
            <li class="b_algo"><h2><a href="https://acmerockets.com/about">Acme Rockets</a></h2></li>
        "#;
        let engine = SearchEngine::primary();
        let fetcher = Arc::new(CannedFetcher::new(&[(
            engine.query_url("Acme official website").as_str(),
            results,
        )]));
        let resolver = WebsiteResolver::new(fetcher);
        assert_eq!(
            resolver.resolve("Acme").await.as_deref(),
            Some("https://acmerockets.com")
        );
    }

    #[tokio::test]
    async fn denylisted_only_results_resolve_to_none() {
        let results = r#"
            <li class="b_algo"><h2><a href="https://www.linkedin.com/company/acme">Acme | LinkedIn</a></h2></li>
            <li class="b_algo"><h2><a href="https://www.crunchbase.com/organization/acme">Acme - Crunchbase</a></h2></li>
            <li class="b_algo"><h2><a href="https://en.wikipedia.org/wiki/Acme">Acme - Wikipedia</a></h2></li>
        "#;
        let primary = SearchEngine::primary();
        let secondary = SearchEngine::secondary();
        let fetcher = Arc::new(CannedFetcher::new(&[
            (primary.query_url("Acme official website").as_str(), results),
            (
                secondary.query_url("Acme official website").as_str(),
                results,
            ),
        ]));
        let resolver = WebsiteResolver::new(fetcher);
        assert_eq!(resolver.resolve("Acme").await, None);
    }

    #[tokio::test]
    async fn all_sources_exhausted_returns_none_with_bounded_calls() {
        let fetcher = Arc::new(CannedFetcher::new(&[]));
        let resolver = WebsiteResolver::new(fetcher.clone());
        assert_eq!(resolver.resolve("Acme").await, None);
        // 7 guesses + 2 engine queries
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 9);
    }

    #[test]
    fn normalizes_to_scheme_and_host() {
        assert_eq!(
            normalize_site_url("acme.io/about?x=1").as_deref(),
            Some("https://acme.io")
        );
        assert_eq!(
            normalize_site_url("http://www.acme.com/jobs").as_deref(),
            Some("http://www.acme.com")
        );
        assert_eq!(normalize_site_url("  "), None);
    }
}
