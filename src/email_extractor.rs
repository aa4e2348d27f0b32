// src/email_extractor.rs
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Domains that never belong to a reachable company inbox: documentation
/// placeholders, template fillers, and infrastructure hosts that leak into
/// scraped markup.
const EXCLUDED_EMAIL_DOMAINS: &[&str] = &[
    "example.com",
    "example.org",
    "test.com",
    "localhost",
    "email.com",
    "mail.com",
    "yourcompany.com",
    "company.com",
    "domain.com",
    "website.com",
    "sentry.io",
    "wixpress.com",
    "schema.org",
    "w3.org",
    "googleapis.com",
    "gstatic.com",
];

/// Local-part shapes that mark an address as a template or a machine
/// sender rather than a person.
const TEMPLATE_EMAIL_PATTERNS: &[&str] = &[
    r"your.*@",
    r"email@",
    r"name@",
    r"info@example",
    r"sample@",
    r"test@",
    r"noreply@",
    r"no-reply@",
    r"donotreply@",
    r"mailer-daemon@",
    r"postmaster@",
];

const MAX_EMAIL_LENGTH: usize = 100;
const CONTEXT_WINDOW: usize = 100;
const MAX_CONTEXT_LENGTH: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    Hr,
    Recruiter,
    Support,
    Sales,
    General,
    Unknown,
}

impl ContactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactKind::Hr => "hr",
            ContactKind::Recruiter => "recruiter",
            ContactKind::Support => "support",
            ContactKind::Sales => "sales",
            ContactKind::General => "general",
            ContactKind::Unknown => "unknown",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "hr" => ContactKind::Hr,
            "recruiter" => ContactKind::Recruiter,
            "support" => ContactKind::Support,
            "sales" => ContactKind::Sales,
            "general" => ContactKind::General,
            _ => ContactKind::Unknown,
        }
    }
}

impl std::fmt::Display for ContactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactPriority {
    High,
    Low,
}

/// An email found in text, with enough surrounding signal to classify it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactDraft {
    pub email: String,
    pub kind: ContactKind,
    pub context: String,
    pub priority: ContactPriority,
}

#[derive(Clone)]
pub struct EmailExtractor {
    email_regex: Regex,
    template_patterns: Vec<Regex>,
    kind_patterns: Vec<(ContactKind, Regex)>,
}

impl Default for EmailExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailExtractor {
    pub fn new() -> Self {
        // Conservative grammar: alphanumeric start, bounded local part,
        // hyphen-safe domain labels, alphabetic TLD.
        let email_regex = Regex::new(
            r"(?i)\b[a-z0-9][a-z0-9._%+-]{0,63}@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
        )
        .unwrap();

        let template_patterns = TEMPLATE_EMAIL_PATTERNS
            .iter()
            .map(|p| Regex::new(p).unwrap())
            .collect();

        // Tested in order, first match wins. The address itself is checked
        // before its context so the local part outranks surrounding copy.
        let kind_patterns = vec![
            (ContactKind::Hr, r"(hr|human\s*resources?|people\s*ops)"),
            (ContactKind::Recruiter, r"(recruit|talent|hiring|career)"),
            (ContactKind::Support, r"(support|help|customer)"),
            (ContactKind::Sales, r"(sales|business|partner)"),
            (ContactKind::General, r"(info|contact|hello|general)"),
        ]
        .into_iter()
        .map(|(kind, pattern)| (kind, Regex::new(pattern).unwrap()))
        .collect();

        Self {
            email_regex,
            template_patterns,
            kind_patterns,
        }
    }

    /// Extract unique, plausible email addresses from arbitrary text.
    /// Lowercased, filtered against the exclusion tables, sorted.
    pub fn extract_emails(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        for found in self.email_regex.find_iter(text) {
            let email = found.as_str().to_lowercase();
            if self.is_valid_email(&email) {
                seen.insert(email);
            }
        }

        let mut emails: Vec<String> = seen.into_iter().collect();
        emails.sort();
        emails
    }

    /// Extract emails together with a classification inferred from the
    /// address and a window of surrounding text. Order of appearance is
    /// preserved, duplicates dropped.
    pub fn extract_emails_with_context(&self, text: &str) -> Vec<ContactDraft> {
        if text.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut drafts = Vec::new();

        for found in self.email_regex.find_iter(text) {
            let email = found.as_str().to_lowercase();
            if !self.is_valid_email(&email) || !seen.insert(email.clone()) {
                continue;
            }

            let context = context_window(text, found.start(), found.end());
            let kind = self.classify(&email, &context);
            drafts.push(ContactDraft {
                email,
                kind,
                context,
                priority: ContactPriority::Low,
            });
        }

        debug!("extracted {} contact candidates from text", drafts.len());
        drafts
    }

    /// Rank contacts for a known company: addresses whose domain overlaps
    /// a normalized prefix of the company name float to the front as
    /// high-priority.
    pub fn rank_for_company(
        &self,
        contacts: Vec<ContactDraft>,
        company_name: &str,
    ) -> Vec<ContactDraft> {
        let hint: String = company_name
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(10)
            .collect();
        if hint.is_empty() {
            return contacts;
        }

        let mut prioritized = Vec::new();
        let mut others = Vec::new();
        for mut contact in contacts {
            let domain_label = contact
                .email
                .split('@')
                .nth(1)
                .and_then(|domain| domain.split('.').next())
                .unwrap_or("")
                .to_string();
            if !domain_label.is_empty()
                && (domain_label.contains(&hint) || hint.contains(&domain_label))
            {
                contact.priority = ContactPriority::High;
                prioritized.push(contact);
            } else {
                others.push(contact);
            }
        }

        prioritized.extend(others);
        prioritized
    }

    fn is_valid_email(&self, email: &str) -> bool {
        if email.len() > MAX_EMAIL_LENGTH || email.contains("..") {
            return false;
        }

        let Some(domain) = email.split('@').nth(1) else {
            return false;
        };
        if EXCLUDED_EMAIL_DOMAINS.contains(&domain) {
            return false;
        }

        !self
            .template_patterns
            .iter()
            .any(|pattern| pattern.is_match(email))
    }

    fn classify(&self, email: &str, context: &str) -> ContactKind {
        for (kind, pattern) in &self.kind_patterns {
            if pattern.is_match(email) {
                return *kind;
            }
        }

        let context_lower = context.to_lowercase();
        for (kind, pattern) in &self.kind_patterns {
            if pattern.is_match(&context_lower) {
                return *kind;
            }
        }

        ContactKind::Unknown
    }
}

/// Whitespace-collapsed window around a match, clamped to char boundaries
/// and capped for storage.
fn context_window(text: &str, start: usize, end: usize) -> String {
    let mut window_start = start.saturating_sub(CONTEXT_WINDOW);
    while window_start > 0 && !text.is_char_boundary(window_start) {
        window_start -= 1;
    }
    let mut window_end = (end + CONTEXT_WINDOW).min(text.len());
    while window_end < text.len() && !text.is_char_boundary(window_end) {
        window_end += 1;
    }

    let collapsed = text[window_start..window_end]
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    collapsed.chars().take(MAX_CONTEXT_LENGTH).collect()
}
