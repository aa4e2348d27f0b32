pub mod adapters;
pub mod fetcher;
pub mod orchestrator;
pub mod resolver;
pub mod result;
pub mod search;

pub use orchestrator::{BatchOutcome, CompanyEnricher, EnrichmentReport};
pub use result::EnrichmentResult;
