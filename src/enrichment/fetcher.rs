// src/enrichment/fetcher.rs
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;

use crate::errors::EnrichmentError;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// The single seam to the network. Every external source goes through one
/// `fetch`, so tests can substitute canned pages and the orchestrator
/// stays observable.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, EnrichmentError>;
}

/// GET with a browser-like header set, redirect-follow, and a short fixed
/// timeout. Failures come back as values; callers log them at debug.
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = Client::builder()
            .user_agent(user_agent.to_string())
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

impl Default for HttpPageFetcher {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            DEFAULT_USER_AGENT,
        )
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, EnrichmentError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| EnrichmentError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::fetch(url, format!("HTTP {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| EnrichmentError::fetch(url, e))
    }
}
