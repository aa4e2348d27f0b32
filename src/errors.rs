use thiserror::Error;

/// Failure taxonomy for enrichment operations.
///
/// `Fetch` and `ParseMiss` are routine outcomes of scraping untrusted
/// sources: the adapter that hit one contributes nothing and the waterfall
/// moves on. The remaining variants escape to the caller.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("expected structure missing: {0}")]
    ParseMiss(String),

    #[error("this operation requires a database pool but none was configured")]
    MissingStorage,

    #[error("company {0} not found")]
    CompanyNotFound(i64),

    #[error("database error: {0}")]
    Database(String),
}

impl EnrichmentError {
    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Transient errors are swallowed at the orchestrator boundary; the
    /// rest propagate.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::ParseMiss(_))
    }
}

impl From<rusqlite::Error> for EnrichmentError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<mobc::Error<rusqlite::Error>> for EnrichmentError {
    fn from(err: mobc::Error<rusqlite::Error>) -> Self {
        Self::Database(err.to_string())
    }
}
