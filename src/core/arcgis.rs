use crate::utils::error::Result;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// ArcGIS REST 的 JSON GET 包裝，所有請求依序執行
#[derive(Debug, Clone)]
pub struct FeatureServerClient {
    client: Client,
}

impl FeatureServerClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_timeout(timeout_seconds: Option<u64>) -> Result<Self> {
        let client = match timeout_seconds {
            Some(secs) => Client::builder()
                .timeout(Duration::from_secs(secs))
                .build()?,
            None => Client::new(),
        };
        Ok(Self { client })
    }

    /// GET `url` with `f=json` plus `params`, and decode the body as `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, params: &[(&str, &str)]) -> Result<T> {
        tracing::debug!("📡 GET {} {:?}", url, params);

        let response = self
            .client
            .get(url)
            .query(&[("f", "json")])
            .query(params)
            .send()
            .await?
            .error_for_status()?;

        tracing::debug!("📡 {} -> {}", url, response.status());
        Ok(response.json::<T>().await?)
    }
}

impl Default for FeatureServerClient {
    fn default() -> Self {
        Self::new()
    }
}
