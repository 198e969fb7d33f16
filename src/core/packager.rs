use crate::core::arcgis::FeatureServerClient;
use crate::core::esri::{to_csv_rows, to_feature_collection, EsriFeatureSet, WGS84_WKID};
use crate::domain::model::{format_time_period, Dataset, Group, LayerDescriptor, Resource, Tag};
use crate::domain::ports::{ConfigProvider, Storage};
use crate::utils::error::{Result, ScraperError};
use crate::utils::slug::slugify;

/// 將單一圖層打包成 dataset：GeoJSON、CSV 與 GeoService 三種資源
pub struct DatasetPackager<'a, S: Storage, C: ConfigProvider> {
    client: &'a FeatureServerClient,
    storage: &'a S,
    config: &'a C,
}

impl<'a, S: Storage, C: ConfigProvider> DatasetPackager<'a, S, C> {
    pub fn new(client: &'a FeatureServerClient, storage: &'a S, config: &'a C) -> Self {
        Self {
            client,
            storage,
            config,
        }
    }

    /// 依 OBJECTID 排序分頁抓取，直到伺服器不再回報 `exceededTransferLimit`
    pub async fn fetch_features(&self, layer: &LayerDescriptor) -> Result<EsriFeatureSet> {
        let query_url = format!("{}/query", layer.layer_url());
        let out_sr = WGS84_WKID.to_string();
        let mut collected = EsriFeatureSet::default();

        loop {
            let offset = collected.features.len().to_string();
            let page: EsriFeatureSet = self
                .client
                .get_json(
                    &query_url,
                    &[
                        ("orderByFields", "OBJECTID"),
                        ("outFields", "*"),
                        ("outSR", out_sr.as_str()),
                        ("resultOffset", offset.as_str()),
                        ("where", "1=1"),
                    ],
                )
                .await?;

            let received = page.features.len();
            if collected.spatial_reference.is_none() {
                collected.spatial_reference = page.spatial_reference;
            }
            collected.features.extend(page.features);

            if !page.exceeded_transfer_limit {
                break;
            }
            if received == 0 {
                tracing::warn!(
                    "⚠️ {} reported more features but returned an empty page at offset {}",
                    layer.layer_url(),
                    offset
                );
                break;
            }
            tracing::debug!(
                "📄 {}: {} features so far, fetching next page",
                layer.layer_url(),
                collected.features.len()
            );
        }

        if let Some(reference) = collected.spatial_reference {
            if !reference.is_wgs84() {
                tracing::warn!(
                    "⚠️ {} answered in {:?} instead of EPSG:{}",
                    layer.layer_url(),
                    reference,
                    WGS84_WKID
                );
            }
        }

        Ok(collected)
    }

    pub async fn generate_dataset(&self, layer: &LayerDescriptor) -> Result<Dataset> {
        let slug = slugify(&layer.layer_name);
        let feature_set = self.fetch_features(layer).await?;

        if feature_set.features.is_empty() {
            return Err(ScraperError::ProcessingError {
                message: format!("layer {} returned no features", layer.layer_url()),
            });
        }

        tracing::info!(
            "🗺️ {}: {} features from {}",
            slug,
            feature_set.features.len(),
            layer.layer_url()
        );

        let dataset_date = format_time_period(&layer.extent());
        if dataset_date.is_none() {
            tracing::warn!("⚠️ {} has no date range, dataset_date left empty", slug);
        }

        let geojson_path = format!("{}.geojson", slug);
        let collection = to_feature_collection(&feature_set);
        let geojson_bytes = serde_json::to_vec_pretty(&collection)?;
        self.storage.write_file(&geojson_path, &geojson_bytes).await?;

        let csv_path = format!("{}.csv", slug);
        let csv_bytes = write_csv(&feature_set)?;
        self.storage.write_file(&csv_path, &csv_bytes).await?;

        let resources = vec![
            Resource::upload(
                csv_path,
                format!("CSV format of the summary of {}", layer.layer_name),
                "csv",
            ),
            Resource::upload(
                geojson_path,
                format!("Geojson format of the summary of {}", layer.layer_name),
                "geojson",
            ),
            Resource::api(
                layer.layer_name.clone(),
                format!("ArcGIS Map Service of the summary of {}", layer.layer_name),
                "geoservice",
                layer.service_url.clone(),
            ),
        ];

        Ok(Dataset {
            name: slug,
            title: format!("{}: {}", self.config.country_name(), layer.layer_name),
            dataset_date,
            groups: vec![Group {
                name: self.config.country_iso3().to_lowercase(),
            }],
            tags: self
                .config
                .tags()
                .iter()
                .map(|name| Tag::new(name.as_str()))
                .collect(),
            resources,
            extras: self.config.dataset_static().clone(),
        })
    }

    pub async fn save_dataset(&self, dataset: &Dataset) -> Result<String> {
        let path = format!("{}.json", dataset.name);
        let bytes = serde_json::to_vec_pretty(dataset)?;
        self.storage.write_file(&path, &bytes).await?;
        tracing::debug!("💾 Dataset metadata written to {}", path);
        Ok(path)
    }
}

fn write_csv(feature_set: &EsriFeatureSet) -> Result<Vec<u8>> {
    let (headers, rows) = to_csv_rows(feature_set);
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&headers)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.into_inner().map_err(|e| ScraperError::ProcessingError {
        message: format!("failed to flush CSV buffer: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{DateExtent, UrlType};
    use chrono::{TimeZone, Utc};
    use httpmock::prelude::*;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.files.lock().await.get(path).cloned().ok_or_else(|| {
                ScraperError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files
                .lock()
                .await
                .insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        tags: Vec<String>,
        dataset_static: BTreeMap<String, serde_json::Value>,
    }

    impl MockConfig {
        fn new() -> Self {
            let mut dataset_static = BTreeMap::new();
            dataset_static.insert("license_id".to_string(), serde_json::json!("cc-by"));
            Self {
                tags: vec!["geodata".to_string()],
                dataset_static,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn base_url(&self) -> &str {
            "http://unused"
        }
        fn folder(&self) -> &str {
            "Folder"
        }
        fn date_field(&self) -> &str {
            "Date_of_Assistance_Deployment"
        }
        fn tags(&self) -> &[String] {
            &self.tags
        }
        fn country_iso3(&self) -> &str {
            "PHL"
        }
        fn country_name(&self) -> &str {
            "Philippines"
        }
        fn output_path(&self) -> &str {
            "test_output"
        }
        fn dataset_static(&self) -> &BTreeMap<String, serde_json::Value> {
            &self.dataset_static
        }
        fn request_timeout_seconds(&self) -> Option<u64> {
            None
        }
    }

    fn layer(server: &MockServer, extent: DateExtent) -> LayerDescriptor {
        LayerDescriptor::new(
            0,
            "TC_CARINA_PS_Response".to_string(),
            server.url("/Svc/MapServer"),
            extent,
        )
    }

    #[tokio::test]
    async fn test_generate_dataset_writes_both_files() {
        let server = MockServer::start();
        let features_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/Svc/MapServer/0/query")
                .query_param("orderByFields", "OBJECTID")
                .query_param("outFields", "*")
                .query_param("outSR", "4326")
                .query_param("resultOffset", "0")
                .query_param("where", "1=1");
            then.status(200).json_body(serde_json::json!({
                "spatialReference": {"wkid": 4326, "latestWkid": 4326},
                "features": [{
                    "attributes": {"OBJECTID": 1, "ObjectID_1": 9, "Company": "Acme"},
                    "geometry": {"x": 120.98, "y": 14.59}
                }]
            }));
        });

        let client = FeatureServerClient::new();
        let storage = MockStorage::default();
        let config = MockConfig::new();
        let packager = DatasetPackager::new(&client, &storage, &config);

        let extent = DateExtent::new(
            Utc.with_ymd_and_hms(2024, 7, 24, 4, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 8, 5, 4, 0, 0).unwrap(),
        );
        let dataset = packager
            .generate_dataset(&layer(&server, extent))
            .await
            .unwrap();

        features_mock.assert();
        assert_eq!(dataset.name, "tc-carina-ps-response");
        assert_eq!(dataset.title, "Philippines: TC_CARINA_PS_Response");
        assert_eq!(
            dataset.dataset_date.as_deref(),
            Some("[2024-07-24T00:00:00 TO 2024-08-05T23:59:59]")
        );
        assert_eq!(dataset.groups, vec![Group { name: "phl".to_string() }]);
        assert_eq!(dataset.extras.get("license_id"), Some(&serde_json::json!("cc-by")));

        let formats: Vec<&str> = dataset.resources.iter().map(|r| r.format.as_str()).collect();
        assert_eq!(formats, vec!["csv", "geojson", "geoservice"]);
        assert_eq!(dataset.resources[2].url, Some(server.url("/Svc/MapServer")));
        assert_eq!(dataset.resources[0].url_type, UrlType::Upload);
        assert_eq!(dataset.resources[2].url_type, UrlType::Api);
        assert_eq!(dataset.tags, vec![Tag::new("geodata")]);

        let csv = String::from_utf8(storage.get_file("tc-carina-ps-response.csv").await.unwrap())
            .unwrap();
        assert_eq!(csv, "OBJECTID,Company,lon,lat\n1,Acme,120.98,14.59\n");

        let geojson: geojson::FeatureCollection = serde_json::from_slice(
            &storage.get_file("tc-carina-ps-response.geojson").await.unwrap(),
        )
        .unwrap();
        assert_eq!(geojson.features.len(), 1);
    }

    #[tokio::test]
    async fn test_generate_dataset_follows_transfer_limit_pages() {
        let server = MockServer::start();
        let first_page = server.mock(|when, then| {
            when.method(GET)
                .path("/Svc/MapServer/0/query")
                .query_param("resultOffset", "0");
            then.status(200).json_body(serde_json::json!({
                "exceededTransferLimit": true,
                "features": [
                    {"attributes": {"OBJECTID": 1, "Company": "Acme"}, "geometry": {"x": 121.0, "y": 14.5}},
                    {"attributes": {"OBJECTID": 2, "Company": "Globe"}, "geometry": {"x": 122.5, "y": 13.25}}
                ]
            }));
        });
        let second_page = server.mock(|when, then| {
            when.method(GET)
                .path("/Svc/MapServer/0/query")
                .query_param("resultOffset", "2");
            then.status(200).json_body(serde_json::json!({
                "exceededTransferLimit": false,
                "features": [
                    {"attributes": {"OBJECTID": 3, "Company": "Smart"}, "geometry": {"x": 123.0, "y": 10.0}}
                ]
            }));
        });

        let client = FeatureServerClient::new();
        let storage = MockStorage::default();
        let config = MockConfig::new();
        let packager = DatasetPackager::new(&client, &storage, &config);

        packager
            .generate_dataset(&layer(&server, DateExtent::empty()))
            .await
            .unwrap();

        first_page.assert();
        second_page.assert();
        let csv = String::from_utf8(storage.get_file("tc-carina-ps-response.csv").await.unwrap())
            .unwrap();
        assert_eq!(
            csv,
            "OBJECTID,Company,lon,lat\n1,Acme,121.0,14.5\n2,Globe,122.5,13.25\n3,Smart,123.0,10.0\n"
        );

        let geojson: geojson::FeatureCollection = serde_json::from_slice(
            &storage.get_file("tc-carina-ps-response.geojson").await.unwrap(),
        )
        .unwrap();
        assert_eq!(geojson.features.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_page_with_transfer_limit_stops_paging() {
        let server = MockServer::start();
        let first_page = server.mock(|when, then| {
            when.method(GET)
                .path("/Svc/MapServer/0/query")
                .query_param("resultOffset", "0");
            then.status(200).json_body(serde_json::json!({
                "exceededTransferLimit": true,
                "features": [{"attributes": {"OBJECTID": 1}, "geometry": null}]
            }));
        });
        let stuck_page = server.mock(|when, then| {
            when.method(GET)
                .path("/Svc/MapServer/0/query")
                .query_param("resultOffset", "1");
            then.status(200).json_body(serde_json::json!({
                "exceededTransferLimit": true,
                "features": []
            }));
        });

        let client = FeatureServerClient::new();
        let storage = MockStorage::default();
        let config = MockConfig::new();
        let packager = DatasetPackager::new(&client, &storage, &config);

        let features = packager
            .fetch_features(&layer(&server, DateExtent::empty()))
            .await
            .unwrap();

        first_page.assert();
        stuck_page.assert_hits(1);
        assert_eq!(features.features.len(), 1);
    }

    #[tokio::test]
    async fn test_generate_dataset_without_features_fails() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/Svc/MapServer/0/query");
            then.status(200)
                .json_body(serde_json::json!({"features": []}));
        });

        let client = FeatureServerClient::new();
        let storage = MockStorage::default();
        let config = MockConfig::new();
        let packager = DatasetPackager::new(&client, &storage, &config);

        let result = packager
            .generate_dataset(&layer(&server, DateExtent::empty()))
            .await;

        assert!(matches!(result, Err(ScraperError::ProcessingError { .. })));
        assert!(storage.get_file("tc-carina-ps-response.csv").await.is_none());
    }

    #[tokio::test]
    async fn test_save_dataset_writes_metadata_json() {
        let client = FeatureServerClient::new();
        let storage = MockStorage::default();
        let config = MockConfig::new();
        let packager = DatasetPackager::new(&client, &storage, &config);

        let dataset = Dataset {
            name: "flood-response".to_string(),
            title: "Philippines: Flood Response".to_string(),
            dataset_date: None,
            groups: vec![],
            tags: vec![],
            resources: vec![],
            extras: config.dataset_static().clone(),
        };

        let path = packager.save_dataset(&dataset).await.unwrap();

        assert_eq!(path, "flood-response.json");
        let saved: serde_json::Value =
            serde_json::from_slice(&storage.read_file(&path).await.unwrap()).unwrap();
        assert_eq!(saved["title"], "Philippines: Flood Response");
        assert_eq!(saved["license_id"], "cc-by");
    }
}
