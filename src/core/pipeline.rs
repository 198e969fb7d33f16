use crate::core::arcgis::FeatureServerClient;
use crate::core::extent::ExtentResolver;
use crate::core::packager::DatasetPackager;
use crate::core::walker::DirectoryWalker;
use crate::core::{ConfigProvider, Dataset, LayerDescriptor, Pipeline, Storage};
use crate::utils::error::Result;

pub struct PdrfPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: FeatureServerClient,
    walker: DirectoryWalker,
}

impl<S: Storage, C: ConfigProvider> PdrfPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let client = FeatureServerClient::with_timeout(config.request_timeout_seconds())?;
        let resolver = ExtentResolver::new(client.clone(), config.date_field());
        let walker = DirectoryWalker::new(
            client.clone(),
            config.base_url(),
            config.folder(),
            resolver,
        );

        Ok(Self {
            storage,
            config,
            client,
            walker,
        })
    }

    fn packager(&self) -> DatasetPackager<'_, S, C> {
        DatasetPackager::new(&self.client, &self.storage, &self.config)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for PdrfPipeline<S, C> {
    async fn list_layers(&self) -> Result<Vec<LayerDescriptor>> {
        tracing::debug!(
            "Walking {}/{}",
            self.config.base_url(),
            self.config.folder()
        );
        self.walker.list_layers().await
    }

    async fn generate_dataset(&self, layer: &LayerDescriptor) -> Result<Dataset> {
        self.packager().generate_dataset(layer).await
    }

    async fn save_dataset(&self, dataset: &Dataset) -> Result<String> {
        let relative = self.packager().save_dataset(dataset).await?;
        Ok(format!("{}/{}", self.config.output_path(), relative))
    }
}
