// src/enrichment/adapters/website.rs
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::{debug, info};

use crate::email_extractor::EmailExtractor;
use crate::enrichment::fetcher::PageFetcher;
use crate::enrichment::resolver::normalize_site_url;
use crate::enrichment::result::EnrichmentResult;
use crate::errors::EnrichmentError;

pub const SOURCE_NAME: &str = "website";

const ABOUT_PATHS: &[&str] = &[
    "/about",
    "/about-us",
    "/aboutus",
    "/company",
    "/our-company",
    "/who-we-are",
    "/our-story",
    "/our-mission",
    "/en/about",
    "/en/company",
];

const CONTACT_PATHS: &[&str] = &[
    "/contact",
    "/contact-us",
    "/contactus",
    "/get-in-touch",
    "/reach-us",
    "/connect",
    "/en/contact",
    "/support/contact",
];

const CAREERS_PATHS: &[&str] = &[
    "/careers",
    "/jobs",
    "/join-us",
    "/join",
    "/work-with-us",
    "/opportunities",
    "/hiring",
    "/en/careers",
    "/company/careers",
];

/// A page shorter than this is a soft 404 or a stub, not the category
/// page we probed for.
const ABOUT_MIN_CONTENT: usize = 1000;
const CONTACT_MIN_CONTENT: usize = 500;
const CAREERS_MIN_CONTENT: usize = 500;

const DESCRIPTION_SELECTORS: &[&str] = &[
    "section.about",
    "div.about",
    "#about",
    "section.company",
    "div.company-description",
    "article",
    "main p",
];

const MAX_DESCRIPTION_LENGTH: usize = 2000;

#[derive(Debug, Clone, Copy)]
enum SocialSlot {
    LinkedIn,
    Glassdoor,
    Twitter,
    Facebook,
}

struct SocialPattern {
    slot: SocialSlot,
    pattern: Regex,
}

/// Scrapes a company's own site: homepage for social links and emails,
/// then About/Contact/Careers pages probed from fixed path lists.
pub struct WebsiteAdapter {
    fetcher: Arc<dyn PageFetcher>,
    extractor: EmailExtractor,
    social_patterns: Vec<SocialPattern>,
    phone_regex: Regex,
}

impl WebsiteAdapter {
    pub fn new(fetcher: Arc<dyn PageFetcher>, extractor: EmailExtractor) -> Self {
        let social_patterns = vec![
            SocialPattern {
                slot: SocialSlot::LinkedIn,
                pattern: Regex::new(r#"linkedin\.com/company/([A-Za-z0-9\-_.%]+)"#).unwrap(),
            },
            SocialPattern {
                slot: SocialSlot::Glassdoor,
                pattern: Regex::new(r#"https?://(?:www\.)?glassdoor\.[a-z.]+/[^\s"'<>]+"#).unwrap(),
            },
            SocialPattern {
                slot: SocialSlot::Twitter,
                pattern: Regex::new(r#"(?:twitter|x)\.com/([A-Za-z0-9_]{2,15})"#).unwrap(),
            },
            SocialPattern {
                slot: SocialSlot::Facebook,
                pattern: Regex::new(r#"facebook\.com/([A-Za-z0-9.\-]{3,})"#).unwrap(),
            },
        ];
        let phone_regex = Regex::new(
            r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}",
        )
        .unwrap();

        Self {
            fetcher,
            extractor,
            social_patterns,
            phone_regex,
        }
    }

    pub async fn enrich(&self, website_url: &str) -> Result<EnrichmentResult, EnrichmentError> {
        let base = normalize_site_url(website_url).ok_or_else(|| {
            EnrichmentError::ParseMiss(format!("invalid website url: {}", website_url))
        })?;

        let mut result = EnrichmentResult::tagged(SOURCE_NAME);
        result.website = Some(base.clone());

        match self.fetcher.fetch(&base).await {
            Ok(homepage) => {
                self.apply_social_links(&homepage, &mut result);
                for draft in self.extractor.extract_emails_with_context(&homepage) {
                    result.push_contact(draft);
                }
            }
            Err(e) => debug!("homepage fetch failed for {}: {}", base, e),
        }

        if let Some((about_url, about_html)) =
            self.probe(&base, ABOUT_PATHS, ABOUT_MIN_CONTENT).await
        {
            result.description = extract_description(&about_html);
            // Social links sometimes only appear in the about footer.
            self.apply_social_links(&about_html, &mut result);
            result.about_url = Some(about_url);
        }

        if let Some((contact_url, contact_html)) = self
            .probe(&base, CONTACT_PATHS, CONTACT_MIN_CONTENT)
            .await
        {
            for draft in self.extractor.extract_emails_with_context(&contact_html) {
                result.push_contact(draft);
            }
            if result.phone.is_none() {
                result.phone = self.find_phone(&contact_html);
            }
            result.contact_url = Some(contact_url);
        }

        if let Some((careers_url, _)) = self
            .probe(&base, CAREERS_PATHS, CAREERS_MIN_CONTENT)
            .await
        {
            result.careers_url = Some(careers_url);
        }

        info!(
            "website enrichment for {}: {} emails, description: {}",
            base,
            result.emails.len(),
            result.description.is_some()
        );
        Ok(result)
    }

    /// First candidate path whose page clears the category's content
    /// threshold.
    async fn probe(&self, base: &str, paths: &[&str], min_len: usize) -> Option<(String, String)> {
        for path in paths {
            let url = format!("{}{}", base, path);
            match self.fetcher.fetch(&url).await {
                Ok(body) if body.len() > min_len => return Some((url, body)),
                Ok(_) => debug!("probe {} below content threshold", url),
                Err(e) => debug!("probe miss {}: {}", url, e),
            }
        }
        None
    }

    fn apply_social_links(&self, html: &str, result: &mut EnrichmentResult) {
        for entry in &self.social_patterns {
            let slot = match entry.slot {
                SocialSlot::LinkedIn => &mut result.linkedin_url,
                SocialSlot::Glassdoor => &mut result.glassdoor_url,
                SocialSlot::Twitter => &mut result.twitter_url,
                SocialSlot::Facebook => &mut result.facebook_url,
            };
            if slot.is_some() {
                continue;
            }
            if let Some(captures) = entry.pattern.captures(html) {
                *slot = Some(match entry.slot {
                    SocialSlot::LinkedIn => format!(
                        "https://www.linkedin.com/company/{}",
                        captures.get(1).map(|m| m.as_str()).unwrap_or_default()
                    ),
                    SocialSlot::Glassdoor => captures.get(0).map_or_else(
                        String::new,
                        |m| m.as_str().to_string(),
                    ),
                    SocialSlot::Twitter => format!(
                        "https://twitter.com/{}",
                        captures.get(1).map(|m| m.as_str()).unwrap_or_default()
                    ),
                    SocialSlot::Facebook => format!(
                        "https://facebook.com/{}",
                        captures.get(1).map(|m| m.as_str()).unwrap_or_default()
                    ),
                });
            }
        }
    }

    fn find_phone(&self, html: &str) -> Option<String> {
        let text = html_to_text(html);
        self.phone_regex.find(&text).map(|m| {
            m.as_str()
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '+')
                .collect()
        })
    }
}

/// Description extraction priority: meta description, OpenGraph
/// description, known content selectors, then a paragraph fallback.
fn extract_description(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    for meta_selector in ["meta[name=\"description\"]", "meta[property=\"og:description\"]"] {
        let selector = Selector::parse(meta_selector).unwrap();
        if let Some(content) = document
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr("content"))
        {
            let trimmed = content.trim();
            if !trimmed.is_empty() {
                return Some(truncate_chars(trimmed, MAX_DESCRIPTION_LENGTH));
            }
        }
    }

    for candidate in DESCRIPTION_SELECTORS {
        let selector = Selector::parse(candidate).unwrap();
        if let Some(element) = document.select(&selector).next() {
            let text = collapse_whitespace(&element.text().collect::<String>());
            if text.len() > 100 {
                return Some(truncate_chars(&text, MAX_DESCRIPTION_LENGTH));
            }
        }
    }

    // Fallback: first substantial paragraphs.
    let paragraph_selector = Selector::parse("p").unwrap();
    let mut collected: Vec<String> = Vec::new();
    for paragraph in document.select(&paragraph_selector).take(10) {
        let text = collapse_whitespace(&paragraph.text().collect::<String>());
        if text.len() > 50 {
            collected.push(text);
        }
        if collected.iter().map(|s| s.len()).sum::<usize>() > 1000 {
            break;
        }
    }
    if collected.is_empty() {
        return None;
    }
    Some(truncate_chars(&collected.join(" "), MAX_DESCRIPTION_LENGTH))
}

fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    collapse_whitespace(&document.root_element().text().collect::<Vec<_>>().join(" "))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct CannedFetcher {
        pages: HashMap<String, String>,
    }

    impl CannedFetcher {
        fn new(pages: &[(&str, String)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, body)| (url.to_string(), body.clone()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for CannedFetcher {
        async fn fetch(&self, url: &str) -> Result<String, EnrichmentError> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| EnrichmentError::fetch(url, "HTTP 404 Not Found"))
        }
    }

    fn adapter(pages: &[(&str, String)]) -> WebsiteAdapter {
        WebsiteAdapter::new(
            Arc::new(CannedFetcher::new(pages)),
            EmailExtractor::new(),
        )
    }

    fn padded(body: &str, len: usize) -> String {
        format!("{}{}", body, "<!-- x -->".repeat(len / 10 + 1))
    }

    #[tokio::test]
    async fn homepage_yields_social_links_and_emails() {
        let homepage = r#"
            <html><body>
              <a href="https://www.linkedin.com/company/acme">LinkedIn</a>
              <a href="https://twitter.com/acmehq">Twitter</a>
              <p>Say hello: hello@acme.io</p>
            </body></html>
        "#
        .to_string();
        let adapter = adapter(&[("https://acme.io", homepage)]);
        let result = adapter.enrich("https://acme.io/landing?x=1").await.unwrap();

        assert_eq!(result.website.as_deref(), Some("https://acme.io"));
        assert_eq!(
            result.linkedin_url.as_deref(),
            Some("https://www.linkedin.com/company/acme")
        );
        assert_eq!(
            result.twitter_url.as_deref(),
            Some("https://twitter.com/acmehq")
        );
        assert_eq!(result.emails, vec!["hello@acme.io"]);
        assert_eq!(result.sources, vec!["website"]);
    }

    #[tokio::test]
    async fn about_page_description_prefers_meta_tag() {
        let about = padded(
            r#"<html><head><meta name="description" content="Acme builds rockets."></head>
               <body><p>Filler paragraph that is long enough to be a fallback description here.</p></body></html>"#,
            1200,
        );
        let adapter = adapter(&[
            ("https://acme.io", "<html></html>".to_string()),
            ("https://acme.io/about", about),
        ]);
        let result = adapter.enrich("https://acme.io").await.unwrap();
        assert_eq!(result.description.as_deref(), Some("Acme builds rockets."));
        assert_eq!(result.about_url.as_deref(), Some("https://acme.io/about"));
    }

    #[tokio::test]
    async fn thin_about_pages_are_skipped_for_later_paths() {
        let thin = "<html><body>stub</body></html>".to_string();
        let real = padded(
            r#"<html><head><meta property="og:description" content="Acme story."></head><body></body></html>"#,
            1200,
        );
        let adapter = adapter(&[
            ("https://acme.io", "<html></html>".to_string()),
            ("https://acme.io/about", thin),
            ("https://acme.io/about-us", real),
        ]);
        let result = adapter.enrich("https://acme.io").await.unwrap();
        assert_eq!(
            result.about_url.as_deref(),
            Some("https://acme.io/about-us")
        );
        assert_eq!(result.description.as_deref(), Some("Acme story."));
    }

    #[tokio::test]
    async fn contact_page_yields_emails_and_phone() {
        let contact = padded(
            r#"<html><body><p>Support: support@acme.io</p><p>Call us: +1 (415) 555-0100</p></body></html>"#,
            600,
        );
        let adapter = adapter(&[
            ("https://acme.io", "<html></html>".to_string()),
            ("https://acme.io/contact", contact),
        ]);
        let result = adapter.enrich("https://acme.io").await.unwrap();
        assert_eq!(result.emails, vec!["support@acme.io"]);
        assert_eq!(result.phone.as_deref(), Some("+14155550100"));
        assert_eq!(
            result.contact_url.as_deref(),
            Some("https://acme.io/contact")
        );
    }

    #[tokio::test]
    async fn total_fetch_failure_still_returns_tagged_result() {
        let adapter = adapter(&[]);
        let result = adapter.enrich("https://acme.io").await.unwrap();
        assert_eq!(result.sources, vec!["website"]);
        assert!(result.emails.is_empty());
        assert!(result.description.is_none());
    }

    #[test]
    fn paragraph_fallback_concatenates_long_paragraphs() {
        let sentence = "Acme has been building reliable small-satellite launch vehicles \
                        for over a decade with a team across three continents.";
        let html = format!(
            "<html><body><p>short</p><p>{}</p><p>{}</p></body></html>",
            sentence, sentence
        );
        let description = extract_description(&html).unwrap();
        assert!(description.starts_with("Acme has been building"));
        assert!(description.len() <= 2000);
    }
}
