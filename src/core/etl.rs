use crate::core::Pipeline;
use crate::utils::error::Result;

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub layers_found: usize,
    pub datasets_written: Vec<String>,
    /// (layer url, error message)
    pub failures: Vec<(String, String)>,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("🚀 Starting layer discovery");

        // 目錄層級失敗直接中止
        let layers = self.pipeline.list_layers().await?;
        let mut summary = RunSummary {
            layers_found: layers.len(),
            ..RunSummary::default()
        };

        for layer in &layers {
            let outcome = match self.pipeline.generate_dataset(layer).await {
                Ok(dataset) => self.pipeline.save_dataset(&dataset).await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(path) => {
                    tracing::info!("✅ {} -> {}", layer.layer_name, path);
                    summary.datasets_written.push(path);
                }
                Err(e) => {
                    tracing::error!(
                        "❌ Packaging failed for {}: {} (Category: {:?})",
                        layer.layer_url(),
                        e,
                        e.category()
                    );
                    summary.failures.push((layer.layer_url(), e.to_string()));
                }
            }
        }

        tracing::info!(
            "📊 {} layers, {} datasets written, {} failures",
            summary.layers_found,
            summary.datasets_written.len(),
            summary.failures.len()
        );

        Ok(summary)
    }

    /// 只列出圖層，不下載資料
    pub async fn dry_run(&self) -> Result<Vec<crate::core::LayerDescriptor>> {
        self.pipeline.list_layers().await
    }
}
