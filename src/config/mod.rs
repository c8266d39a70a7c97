#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::adapters::http::{BIGG_BASE_URL, KEGG_BASE_URL};
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::path::PathBuf;
use std::time::Duration;
use toml_config::TomlConfig;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://metanetx.db";
pub const DEFAULT_CONFIG_FILE: &str = "metanetx-post.toml";
pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_CONCURRENT_REQUESTS: usize = 5;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Effective settings after merging defaults, the TOML file and CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_url: String,
    pub kegg_base_url: String,
    pub bigg_base_url: String,
    pub timeout_seconds: u64,
    pub batch_size: usize,
    pub concurrent_requests: usize,
    pub obabel: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            kegg_base_url: KEGG_BASE_URL.to_string(),
            bigg_base_url: BIGG_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            batch_size: DEFAULT_BATCH_SIZE,
            concurrent_requests: DEFAULT_CONCURRENT_REQUESTS,
            obabel: None,
        }
    }
}

impl Settings {
    pub fn from_toml(config: &TomlConfig) -> Self {
        let mut settings = Self::default();

        if let Some(database) = &config.database {
            settings.database_url = database.url.clone();
        }
        if let Some(sources) = &config.sources {
            if let Some(url) = &sources.kegg_base_url {
                settings.kegg_base_url = url.clone();
            }
            if let Some(url) = &sources.bigg_base_url {
                settings.bigg_base_url = url.clone();
            }
            if let Some(timeout) = sources.timeout_seconds {
                settings.timeout_seconds = timeout;
            }
        }
        if let Some(etl) = &config.etl {
            settings.batch_size = etl.batch_size.unwrap_or(settings.batch_size);
            settings.concurrent_requests = etl
                .concurrent_requests
                .unwrap_or(settings.concurrent_requests);
        }
        settings.obabel = config
            .toolkit
            .as_ref()
            .and_then(|t| t.obabel.as_ref())
            .map(PathBuf::from);

        settings
    }
}

impl ConfigProvider for Settings {
    fn database_url(&self) -> &str {
        &self.database_url
    }

    fn kegg_base_url(&self) -> &str {
        &self.kegg_base_url
    }

    fn bigg_base_url(&self) -> &str {
        &self.bigg_base_url
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_database_url("database.url", &self.database_url)?;
        validation::validate_url("sources.kegg_base_url", &self.kegg_base_url)?;
        validation::validate_url("sources.bigg_base_url", &self.bigg_base_url)?;
        validation::validate_range("sources.timeout_seconds", self.timeout_seconds, 1, 3600)?;
        validation::validate_positive_number("etl.batch_size", self.batch_size, 1)?;
        validation::validate_range("etl.concurrent_requests", self.concurrent_requests, 1, 64)?;
        Ok(())
    }
}
