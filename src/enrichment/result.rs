// src/enrichment/result.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::email_extractor::ContactDraft;

/// Partial company knowledge accumulated across sources. One enrichment
/// call owns its result exclusively until it is returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub website: Option<String>,
    pub description: Option<String>,
    pub linkedin_url: Option<String>,
    pub glassdoor_url: Option<String>,
    pub twitter_url: Option<String>,
    pub facebook_url: Option<String>,
    pub phone: Option<String>,
    pub careers_url: Option<String>,
    pub about_url: Option<String>,
    pub contact_url: Option<String>,
    pub industry: Option<String>,
    pub founded: Option<String>,
    pub headquarters: Option<String>,
    pub num_employees: Option<String>,
    /// Always the deduplicated email set of `contacts`, in contact order.
    pub emails: Vec<String>,
    pub contacts: Vec<ContactDraft>,
    /// Which sources contributed, in consultation order.
    pub sources: Vec<String>,
    pub enriched_at: DateTime<Utc>,
}

impl Default for EnrichmentResult {
    fn default() -> Self {
        Self::new()
    }
}

impl EnrichmentResult {
    pub fn new() -> Self {
        Self {
            website: None,
            description: None,
            linkedin_url: None,
            glassdoor_url: None,
            twitter_url: None,
            facebook_url: None,
            phone: None,
            careers_url: None,
            about_url: None,
            contact_url: None,
            industry: None,
            founded: None,
            headquarters: None,
            num_employees: None,
            emails: Vec::new(),
            contacts: Vec::new(),
            sources: Vec::new(),
            enriched_at: Utc::now(),
        }
    }

    /// Empty result carrying only the name of the source that produced it.
    pub fn tagged(source: &str) -> Self {
        let mut result = Self::new();
        result.sources.push(source.to_string());
        result
    }

    /// Add a contact, keeping `emails` in lockstep. Duplicate emails are
    /// dropped, first occurrence wins.
    pub fn push_contact(&mut self, contact: ContactDraft) {
        if self.contacts.iter().any(|c| c.email == contact.email) {
            return;
        }
        self.emails.push(contact.email.clone());
        self.contacts.push(contact);
    }

    /// First-found-wins merge: scalar fields already populated in `self`
    /// are never replaced; list fields are unioned without duplicates.
    pub fn merge(&mut self, other: EnrichmentResult) {
        merge_field(&mut self.website, other.website);
        merge_field(&mut self.description, other.description);
        merge_field(&mut self.linkedin_url, other.linkedin_url);
        merge_field(&mut self.glassdoor_url, other.glassdoor_url);
        merge_field(&mut self.twitter_url, other.twitter_url);
        merge_field(&mut self.facebook_url, other.facebook_url);
        merge_field(&mut self.phone, other.phone);
        merge_field(&mut self.careers_url, other.careers_url);
        merge_field(&mut self.about_url, other.about_url);
        merge_field(&mut self.contact_url, other.contact_url);
        merge_field(&mut self.industry, other.industry);
        merge_field(&mut self.founded, other.founded);
        merge_field(&mut self.headquarters, other.headquarters);
        merge_field(&mut self.num_employees, other.num_employees);

        for contact in other.contacts {
            self.push_contact(contact);
        }
        for source in other.sources {
            self.push_source(&source);
        }
    }

    pub fn push_source(&mut self, source: &str) {
        if !self.sources.iter().any(|s| s == source) {
            self.sources.push(source.to_string());
        }
    }

    /// The three scalar target fields.
    pub fn is_complete(&self) -> bool {
        self.website.is_some() && self.description.is_some() && self.linkedin_url.is_some()
    }

    /// Waterfall stopping condition: the scalar targets plus at least one
    /// contact.
    pub fn target_complete(&self) -> bool {
        self.is_complete() && !self.contacts.is_empty()
    }

    /// Populated fraction of the fields the write-back step can fill,
    /// plus contactability.
    pub fn completeness_score(&self) -> f64 {
        let fields = [
            &self.website,
            &self.description,
            &self.linkedin_url,
            &self.glassdoor_url,
            &self.industry,
            &self.num_employees,
        ];
        let mut populated = fields.iter().filter(|field| field.is_some()).count();
        if !self.emails.is_empty() {
            populated += 1;
        }
        populated as f64 / (fields.len() + 1) as f64
    }
}

fn merge_field(slot: &mut Option<String>, candidate: Option<String>) {
    if slot.is_some() {
        return;
    }
    if let Some(value) = candidate {
        if !value.trim().is_empty() {
            *slot = Some(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email_extractor::{ContactKind, ContactPriority};

    fn draft(email: &str) -> ContactDraft {
        ContactDraft {
            email: email.to_string(),
            kind: ContactKind::General,
            context: String::new(),
            priority: ContactPriority::Low,
        }
    }

    fn populated() -> EnrichmentResult {
        let mut result = EnrichmentResult::tagged("website");
        result.website = Some("https://acme.io".to_string());
        result.description = Some("Acme builds rockets".to_string());
        result.linkedin_url = Some("https://www.linkedin.com/company/acme".to_string());
        result.push_contact(draft("info@acme.io"));
        result
    }

    #[test]
    fn merge_is_idempotent() {
        let mut a = populated();
        let snapshot = a.clone();
        a.merge(snapshot.clone());
        assert_eq!(a.website, snapshot.website);
        assert_eq!(a.emails, snapshot.emails);
        assert_eq!(a.contacts.len(), snapshot.contacts.len());
        assert_eq!(a.sources, snapshot.sources);
    }

    #[test]
    fn merge_never_replaces_populated_fields() {
        let mut a = populated();
        let mut b = EnrichmentResult::tagged("wikipedia");
        b.website = Some("https://acme-aggregator.example".to_string());
        b.industry = Some("Aerospace".to_string());
        a.merge(b);
        assert_eq!(a.website.as_deref(), Some("https://acme.io"));
        assert_eq!(a.industry.as_deref(), Some("Aerospace"));
        assert_eq!(a.sources, vec!["website", "wikipedia"]);
    }

    #[test]
    fn merge_ignores_blank_values() {
        let mut a = EnrichmentResult::new();
        let mut b = EnrichmentResult::new();
        b.description = Some("   ".to_string());
        a.merge(b);
        assert!(a.description.is_none());
    }

    #[test]
    fn emails_track_contacts() {
        let mut result = EnrichmentResult::new();
        result.push_contact(draft("a@acme.io"));
        result.push_contact(draft("b@acme.io"));
        result.push_contact(draft("a@acme.io"));
        assert_eq!(result.emails, vec!["a@acme.io", "b@acme.io"]);
        assert_eq!(result.contacts.len(), 2);
    }

    #[test]
    fn target_complete_needs_all_targets_and_a_contact() {
        let mut result = populated();
        assert!(result.target_complete());

        result.contacts.clear();
        result.emails.clear();
        assert!(result.is_complete());
        assert!(!result.target_complete());

        let mut missing_description = populated();
        missing_description.description = None;
        assert!(!missing_description.target_complete());
    }

    #[test]
    fn completeness_score_counts_fixed_subset() {
        let empty = EnrichmentResult::new();
        assert_eq!(empty.completeness_score(), 0.0);

        let full = populated();
        let expected = 4.0 / 7.0;
        assert!((full.completeness_score() - expected).abs() < 1e-9);
    }
}
