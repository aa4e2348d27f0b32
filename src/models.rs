use crate::{config::Config, database::DbPool, enrichment::CompanyEnricher};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub struct CliApp {
    pub config: Config,
    pub db_pool: DbPool,
    pub enricher: CompanyEnricher,
}

impl CliApp {
    pub fn new(config: Config, db_pool: DbPool) -> Self {
        let enricher = CompanyEnricher::new(config.enrichment.clone(), Some(db_pool.clone()));
        Self {
            config,
            db_pool,
            enricher,
        }
    }
}
