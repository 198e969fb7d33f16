use crate::core::extent::DEFAULT_DATE_FIELD;
use crate::core::ConfigProvider;
use crate::utils::error::{Result, ScraperError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub source: SourceConfig,
    pub dataset: DatasetConfig,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub base_url: String,
    pub folder: String,
    #[serde(default = "default_date_field")]
    pub date_field: String,
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub country_iso3: String,
    pub country_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// 靜態 metadata（license、maintainer、owner_org…）
    #[serde(default, rename = "static")]
    pub static_fields: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
}

fn default_date_field() -> String {
    DEFAULT_DATE_FIELD.to_string()
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScraperError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ScraperError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PDRF_BASE_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ScraperError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("source.base_url", &self.source.base_url)?;
        validation::validate_non_empty_string("source.folder", &self.source.folder)?;
        validation::validate_non_empty_string("source.date_field", &self.source.date_field)?;
        if let Some(timeout) = self.source.request_timeout_seconds {
            validation::validate_positive_number("source.request_timeout_seconds", timeout, 1)?;
        }
        validation::validate_iso3("dataset.country_iso3", &self.dataset.country_iso3)?;
        validation::validate_non_empty_string("dataset.country_name", &self.dataset.country_name)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;
        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn base_url(&self) -> &str {
        &self.source.base_url
    }

    fn folder(&self) -> &str {
        &self.source.folder
    }

    fn date_field(&self) -> &str {
        &self.source.date_field
    }

    fn tags(&self) -> &[String] {
        &self.dataset.tags
    }

    fn country_iso3(&self) -> &str {
        &self.dataset.country_iso3
    }

    fn country_name(&self) -> &str {
        &self.dataset.country_name
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn dataset_static(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.dataset.static_fields
    }

    fn request_timeout_seconds(&self) -> Option<u64> {
        self.source.request_timeout_seconds
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
