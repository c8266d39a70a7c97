use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub database: Option<DatabaseConfig>,
    pub sources: Option<SourcesConfig>,
    pub etl: Option<EtlConfig>,
    pub toolkit: Option<ToolkitConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    pub kegg_base_url: Option<String>,
    pub bigg_base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EtlConfig {
    pub batch_size: Option<usize>,
    pub concurrent_requests: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolkitConfig {
    /// Path of the `obabel` executable; looked up on PATH when absent.
    pub obabel: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATABASE_URL})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        let re = Regex::new(r"\$\{([^}]+)\}").expect("valid regex");

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(database) = &self.database {
            validation::validate_database_url("database.url", &database.url)?;
        }

        if let Some(sources) = &self.sources {
            if let Some(url) = &sources.kegg_base_url {
                validation::validate_url("sources.kegg_base_url", url)?;
            }
            if let Some(url) = &sources.bigg_base_url {
                validation::validate_url("sources.bigg_base_url", url)?;
            }
        }

        if let Some(etl) = &self.etl {
            if let Some(batch_size) = etl.batch_size {
                validation::validate_positive_number("etl.batch_size", batch_size, 1)?;
            }
            if let Some(concurrent) = etl.concurrent_requests {
                validation::validate_positive_number("etl.concurrent_requests", concurrent, 1)?;
            }
        }

        if let Some(obabel) = self.toolkit.as_ref().and_then(|t| t.obabel.as_deref()) {
            validation::validate_path("toolkit.obabel", obabel)?;
        }

        Ok(())
    }
}
