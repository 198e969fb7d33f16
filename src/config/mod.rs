#[cfg(feature = "cli")]
pub mod cli;
pub mod dataset_static;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use std::collections::BTreeMap;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "pdrf-scraper")]
#[command(about = "Discover PDRF map-service layers and package them as HDX datasets")]
pub struct CliConfig {
    #[arg(long, default_value = "https://handa.pdrf.org.ph/arcgis/rest/services")]
    pub base_url: String,

    #[arg(long, default_value = "2024_PS_Response_Efforts")]
    pub folder: String,

    #[arg(long, default_value = crate::core::extent::DEFAULT_DATE_FIELD)]
    pub date_field: String,

    #[arg(
        long,
        value_delimiter = ',',
        default_values = ["cyclones-hurricanes-typhoons", "disaster risk reduction-drr", "geodata"]
    )]
    pub tags: Vec<String>,

    #[arg(long, default_value = "PHL")]
    pub country_iso3: String,

    #[arg(long, default_value = "Philippines")]
    pub country_name: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, help = "Per-request timeout in seconds (no timeout when unset)")]
    pub request_timeout: Option<u64>,

    #[arg(
        short,
        long,
        help = "TOML configuration file; replaces the source, dataset and load options above"
    )]
    pub config: Option<String>,

    #[arg(long, help = "List layers and their date ranges without packaging")]
    pub dry_run: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long = "dataset-static",
        help = "TOML or JSON file of static dataset fields; replaces the PDRF defaults"
    )]
    pub dataset_static_file: Option<String>,

    #[arg(skip = dataset_static::pdrf_defaults())]
    pub dataset_static: BTreeMap<String, serde_json::Value>,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 有指定 `--dataset-static` 時以檔案內容取代預設靜態欄位
    pub fn load_dataset_static(&mut self) -> Result<()> {
        if let Some(path) = &self.dataset_static_file {
            self.dataset_static = dataset_static::from_file(path)?;
        }
        Ok(())
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn folder(&self) -> &str {
        &self.folder
    }

    fn date_field(&self) -> &str {
        &self.date_field
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn country_iso3(&self) -> &str {
        &self.country_iso3
    }

    fn country_name(&self) -> &str {
        &self.country_name
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn dataset_static(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.dataset_static
    }

    fn request_timeout_seconds(&self) -> Option<u64> {
        self.request_timeout
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("base_url", &self.base_url)?;
        validation::validate_non_empty_string("folder", &self.folder)?;
        validation::validate_non_empty_string("date_field", &self.date_field)?;
        validation::validate_iso3("country_iso3", &self.country_iso3)?;
        validation::validate_path("output_path", &self.output_path)?;
        if let Some(timeout) = self.request_timeout {
            validation::validate_positive_number("request_timeout", timeout, 1)?;
        }
        Ok(())
    }
}
