// src/enrichment/adapters/web_search.rs
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

use crate::enrichment::fetcher::PageFetcher;
use crate::enrichment::result::EnrichmentResult;
use crate::enrichment::search::{SearchEngine, SearchHit};
use crate::errors::EnrichmentError;

pub const SOURCE_NAME: &str = "web_search";

const MIN_SNIPPET_LENGTH: usize = 50;

/// Last-resort source: one generic search, mined for profile links and a
/// description-looking snippet.
pub struct WebSearchAdapter {
    fetcher: Arc<dyn PageFetcher>,
    engine: SearchEngine,
    linkedin_regex: Regex,
}

impl WebSearchAdapter {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            engine: SearchEngine::primary(),
            linkedin_regex: Regex::new(r"linkedin\.com/company/([A-Za-z0-9\-_.%]+)").unwrap(),
        }
    }

    pub async fn enrich(&self, company_name: &str) -> Result<EnrichmentResult, EnrichmentError> {
        let query = format!("{} company", company_name);
        let html = self.fetcher.fetch(&self.engine.query_url(&query)).await?;
        let hits = self.engine.parse_results(&html);
        if hits.is_empty() {
            return Err(EnrichmentError::ParseMiss(format!(
                "no search results for {}",
                company_name
            )));
        }

        let mut result = EnrichmentResult::tagged(SOURCE_NAME);
        for hit in &hits {
            self.apply_profile_links(hit, &mut result);
        }
        result.description = description_from_snippets(&hits, company_name);

        if result.description.is_none() && result.linkedin_url.is_none() {
            debug!("search fallback found nothing usable for {}", company_name);
        }
        info!(
            "search fallback for {}: linkedin {}, description {}",
            company_name,
            result.linkedin_url.is_some(),
            result.description.is_some()
        );
        Ok(result)
    }

    fn apply_profile_links(&self, hit: &SearchHit, result: &mut EnrichmentResult) {
        if result.linkedin_url.is_none() {
            if let Some(slug) = self
                .linkedin_regex
                .captures(&hit.url)
                .and_then(|captures| captures.get(1))
            {
                result.linkedin_url = Some(format!(
                    "https://www.linkedin.com/company/{}",
                    slug.as_str().trim_end_matches('/')
                ));
                return;
            }
        }

        let Some(host) = Url::parse(&hit.url).ok().and_then(|u| u.host_str().map(String::from))
        else {
            return;
        };
        if result.glassdoor_url.is_none() && host_matches(&host, "glassdoor.com") {
            result.glassdoor_url = Some(hit.url.clone());
        } else if result.twitter_url.is_none()
            && (host_matches(&host, "twitter.com") || host_matches(&host, "x.com"))
        {
            result.twitter_url = Some(hit.url.clone());
        } else if result.facebook_url.is_none() && host_matches(&host, "facebook.com") {
            result.facebook_url = Some(hit.url.clone());
        }
    }
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{}", domain))
}

/// First substantial snippet that actually mentions the company.
fn description_from_snippets(hits: &[SearchHit], company_name: &str) -> Option<String> {
    let needle = company_name.to_lowercase();
    hits.iter()
        .find(|hit| {
            hit.snippet.len() > MIN_SNIPPET_LENGTH && hit.snippet.to_lowercase().contains(&needle)
        })
        .map(|hit| hit.snippet.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct OnePageFetcher {
        body: String,
    }

    #[async_trait]
    impl PageFetcher for OnePageFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, EnrichmentError> {
            Ok(self.body.clone())
        }
    }

    async fn run(body: &str) -> Result<EnrichmentResult, EnrichmentError> {
        let adapter = WebSearchAdapter::new(Arc::new(OnePageFetcher {
            body: body.to_string(),
        }));
        adapter.enrich("Acme").await
    }

    #[tokio::test]
    async fn collects_profile_links_and_snippet_description() {
        let body = r#"
            <li class="b_algo">
              <h2><a href="https://www.linkedin.com/company/acme">Acme | LinkedIn</a></h2>
              <p>Short.</p>
            </li>
            <li class="b_algo">
              <h2><a href="https://www.glassdoor.com/Overview/acme">Acme Reviews</a></h2>
              <p>Acme is a rocket company known for dependable smallsat launches.</p>
            </li>
        "#;
        let result = run(body).await.unwrap();
        assert_eq!(
            result.linkedin_url.as_deref(),
            Some("https://www.linkedin.com/company/acme")
        );
        assert_eq!(
            result.glassdoor_url.as_deref(),
            Some("https://www.glassdoor.com/Overview/acme")
        );
        assert_eq!(
            result.description.as_deref(),
            Some("Acme is a rocket company known for dependable smallsat launches.")
        );
        assert_eq!(result.sources, vec!["web_search"]);
    }

    #[tokio::test]
    async fn snippets_not_mentioning_the_company_are_ignored() {
        let body = r#"
            <li class="b_algo">
              <h2><a href="https://somewhere.example/">Generic result</a></h2>
              <p>A long enough snippet about a completely different organization here.</p>
            </li>
        "#;
        let result = run(body).await.unwrap();
        assert!(result.description.is_none());
    }

    #[tokio::test]
    async fn no_results_is_a_parse_miss() {
        let err = run("<html><body>captcha</body></html>").await.unwrap_err();
        assert!(err.is_transient());
    }
}
