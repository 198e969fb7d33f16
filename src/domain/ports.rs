use crate::domain::model::{Dataset, LayerDescriptor};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn folder(&self) -> &str;
    fn date_field(&self) -> &str;
    fn tags(&self) -> &[String];
    fn country_iso3(&self) -> &str;
    fn country_name(&self) -> &str;
    fn output_path(&self) -> &str;
    fn dataset_static(&self) -> &BTreeMap<String, serde_json::Value>;
    fn request_timeout_seconds(&self) -> Option<u64>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn list_layers(&self) -> Result<Vec<LayerDescriptor>>;
    async fn generate_dataset(&self, layer: &LayerDescriptor) -> Result<Dataset>;
    async fn save_dataset(&self, dataset: &Dataset) -> Result<String>;
}
