pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use config::toml_config::TomlConfig;
pub use core::{etl::EtlEngine, pipeline::PdrfPipeline};
pub use domain::model::{DateExtent, LayerDescriptor};
pub use utils::error::{Result, ScraperError};
