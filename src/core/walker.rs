use crate::core::arcgis::FeatureServerClient;
use crate::core::extent::ExtentResolver;
use crate::domain::model::{DateExtent, LayerDescriptor, ServiceDescriptor};
use crate::utils::error::{Result, ScraperError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct DirectoryListing {
    #[serde(default)]
    services: Vec<ServiceEntry>,
}

#[derive(Debug, Deserialize)]
struct ServiceEntry {
    name: String,
    #[serde(rename = "type")]
    service_type: String,
}

#[derive(Debug, Deserialize)]
struct ServiceListing {
    #[serde(default)]
    layers: Option<Vec<LayerEntry>>,
}

#[derive(Debug, Deserialize)]
struct LayerEntry {
    id: i64,
    name: String,
}

/// 列舉資料夾下的所有服務，再列舉每個服務的圖層
#[derive(Debug, Clone)]
pub struct DirectoryWalker {
    client: FeatureServerClient,
    base_url: String,
    folder: String,
    resolver: ExtentResolver,
}

impl DirectoryWalker {
    pub fn new(
        client: FeatureServerClient,
        base_url: impl Into<String>,
        folder: impl Into<String>,
        resolver: ExtentResolver,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            folder: folder.into(),
            resolver,
        }
    }

    pub async fn list_services(&self) -> Result<Vec<ServiceDescriptor>> {
        let directory_url = format!("{}/{}", self.base_url, self.folder);
        let listing: DirectoryListing = self.fetch_listing(&directory_url).await?;

        tracing::info!(
            "📂 Found {} services under {}",
            listing.services.len(),
            self.folder
        );

        Ok(listing
            .services
            .into_iter()
            .map(|entry| ServiceDescriptor::new(&self.base_url, entry.name, entry.service_type))
            .collect())
    }

    pub async fn list_layers(&self) -> Result<Vec<LayerDescriptor>> {
        let mut results = Vec::new();

        for service in self.list_services().await? {
            let listing: ServiceListing = self.fetch_listing(&service.url).await?;
            let layers = listing.layers.unwrap_or_default();
            if layers.is_empty() {
                tracing::debug!("⏭️ Service {} has no layers, skipping", service.name);
                continue;
            }

            for layer in layers {
                let layer_url = format!("{}/{}", service.url, layer.id);

                let extent = match self.resolver.resolve_extent(&layer_url).await {
                    Ok(extent) => extent,
                    Err(e) => {
                        tracing::warn!("⚠️ Stats failed for {}: {}", layer_url, e);
                        DateExtent::empty()
                    }
                };

                results.push(LayerDescriptor::new(
                    layer.id,
                    layer.name,
                    service.url.clone(),
                    extent,
                ));
            }
        }

        tracing::info!("📂 Discovered {} layers", results.len());
        Ok(results)
    }

    async fn fetch_listing<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.client
            .get_json(url, &[])
            .await
            .map_err(|e| ScraperError::DirectoryUnavailable {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }
}
