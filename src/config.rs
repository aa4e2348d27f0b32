use serde::{Deserialize, Serialize};

use crate::enrichment::fetcher::{DEFAULT_TIMEOUT_SECONDS, DEFAULT_USER_AGENT};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub enrichment: EnrichmentConfig,
    pub logging: LoggingConfig,
    pub output: OutputConfig,
    pub database: DatabaseConfig,
}

/// Knobs for the external-source waterfall. Every network call carries
/// `request_timeout_seconds`; batch runs pause `batch_delay_ms` (plus
/// jitter) between companies.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnrichmentConfig {
    pub request_timeout_seconds: u64,
    pub user_agent: String,
    pub batch_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub directory: String,
    pub pretty_json: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            batch_delay_ms: 1500,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enrichment: EnrichmentConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            output: OutputConfig {
                directory: "out".to_string(),
                pretty_json: true,
            },
            database: DatabaseConfig {
                path: "data/companies.db".to_string(),
            },
        }
    }
}

pub async fn load_config(
    path: &str,
) -> std::result::Result<Config, Box<dyn std::error::Error + Send + Sync>> {
    let content = tokio::fs::read_to_string(path).await?;
    let config: Config = serde_yaml::from_str(&content)?;
    Ok(config)
}
