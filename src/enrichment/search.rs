// src/enrichment/search.rs
use scraper::{Html, Selector};
use url::Url;

/// One parsed organic result.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

/// A search engine is data: a query URL prefix and the selectors that
/// locate its organic results. Swapping engines means swapping a table
/// entry, not a code path.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    pub name: &'static str,
    query_prefix: &'static str,
    result_selector: &'static str,
    link_selector: &'static str,
    snippet_selector: &'static str,
}

impl SearchEngine {
    /// Bing's HTML results page.
    pub fn primary() -> Self {
        Self {
            name: "bing",
            query_prefix: "https://www.bing.com/search?q=",
            result_selector: "li.b_algo",
            link_selector: "h2 a",
            snippet_selector: "p",
        }
    }

    /// DuckDuckGo's plain-HTML endpoint, more tolerant of scripted
    /// clients than the primary engine.
    pub fn secondary() -> Self {
        Self {
            name: "duckduckgo",
            query_prefix: "https://html.duckduckgo.com/html/?q=",
            result_selector: "div.result",
            link_selector: "a.result__a",
            snippet_selector: "a.result__snippet",
        }
    }

    pub fn query_url(&self, query: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        format!("{}{}", self.query_prefix, encoded)
    }

    /// Parse the organic results out of a results page. Results without a
    /// resolvable http(s) link are skipped.
    pub fn parse_results(&self, html: &str) -> Vec<SearchHit> {
        let document = Html::parse_document(html);
        let result_selector = Selector::parse(self.result_selector).unwrap();
        let link_selector = Selector::parse(self.link_selector).unwrap();
        let snippet_selector = Selector::parse(self.snippet_selector).unwrap();

        let mut hits = Vec::new();
        for result in document.select(&result_selector) {
            let Some(link) = result.select(&link_selector).next() else {
                continue;
            };
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let Some(url) = resolve_result_href(href) else {
                continue;
            };

            let title = collapse_whitespace(&link.text().collect::<String>());
            let snippet = result
                .select(&snippet_selector)
                .next()
                .map(|el| collapse_whitespace(&el.text().collect::<String>()))
                .unwrap_or_default();

            hits.push(SearchHit {
                url,
                title,
                snippet,
            });
        }
        hits
    }
}

/// Normalize a result href to an absolute http(s) URL, unwrapping the
/// secondary engine's `uddg` redirect parameter.
fn resolve_result_href(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };

    let parsed = Url::parse(&absolute).ok()?;
    if !parsed.scheme().starts_with("http") {
        return None;
    }

    let host = parsed.host_str()?;
    if host.ends_with("duckduckgo.com") && parsed.path().starts_with("/l/") {
        return parsed
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned());
    }

    Some(absolute)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
