use chrono::{TimeZone, Utc};
use httpmock::prelude::*;
use pdrf_scraper::core::arcgis::FeatureServerClient;
use pdrf_scraper::core::extent::{ExtentResolver, DEFAULT_DATE_FIELD};
use pdrf_scraper::core::walker::DirectoryWalker;
use pdrf_scraper::LayerDescriptor;

const BASE_PATH: &str = "/arcgis/rest/services";
const FOLDER: &str = "2024_PS_Response_Efforts";

fn mount_fixture_directory(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET)
            .path(format!("{}/{}", BASE_PATH, FOLDER))
            .query_param("f", "json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "currentVersion": 10.81,
                "folders": [],
                "services": [
                    {"name": "2024_PS_Response_Efforts/TC_2024_000127_PHL_PDRF_PSResponse", "type": "MapServer"},
                    {"name": "2024_PS_Response_Efforts/TC_2024_000130_PHL_PDRF_PSResponse", "type": "MapServer"},
                    {"name": "2024_PS_Response_Efforts/Basemap_Placeholder", "type": "MapServer"}
                ]
            }));
    });

    server.mock(|when, then| {
        when.method(GET)
            .path(format!(
                "{}/{}/TC_2024_000127_PHL_PDRF_PSResponse/MapServer",
                BASE_PATH, FOLDER
            ))
            .query_param("f", "json");
        then.status(200).json_body(serde_json::json!({
            "layers": [
                {"id": 0, "name": "TC_CARINA_PS_Response", "parentLayerId": -1},
                {"id": 1, "name": "TC_CARINA_Relief_Hubs", "parentLayerId": -1}
            ]
        }));
    });

    server.mock(|when, then| {
        when.method(GET)
            .path(format!(
                "{}/{}/TC_2024_000130_PHL_PDRF_PSResponse/MapServer",
                BASE_PATH, FOLDER
            ))
            .query_param("f", "json");
        then.status(200).json_body(serde_json::json!({
            "layers": [{"id": 0, "name": "TC_ENTENG_PS_Response"}]
        }));
    });

    server.mock(|when, then| {
        when.method(GET)
            .path(format!("{}/{}/Basemap_Placeholder/MapServer", BASE_PATH, FOLDER))
            .query_param("f", "json");
        then.status(200).json_body(serde_json::json!({"layers": []}));
    });

    server.mock(|when, then| {
        when.method(GET)
            .path(format!(
                "{}/{}/TC_2024_000127_PHL_PDRF_PSResponse/MapServer/0/query",
                BASE_PATH, FOLDER
            ))
            .query_param("returnGeometry", "false")
            .query_param_exists("outStatistics");
        then.status(200).json_body(serde_json::json!({
            "displayFieldName": "",
            "fields": [
                {"name": "min_date", "type": "esriFieldTypeDate", "alias": "min_date"},
                {"name": "max_date", "type": "esriFieldTypeDate", "alias": "max_date"}
            ],
            "features": [{"attributes": {
                "min_date": "07/24/2024 04:00:00 AM",
                "max_date": "08/05/2024 04:00:00 AM"
            }}]
        }));
    });

    // Relief hubs layer has no date column
    server.mock(|when, then| {
        when.method(GET)
            .path(format!(
                "{}/{}/TC_2024_000127_PHL_PDRF_PSResponse/MapServer/1/query",
                BASE_PATH, FOLDER
            ));
        then.status(200).json_body(serde_json::json!({
            "error": {"code": 400, "message": "Unable to complete operation.", "details": []}
        }));
    });

    server.mock(|when, then| {
        when.method(GET)
            .path(format!(
                "{}/{}/TC_2024_000130_PHL_PDRF_PSResponse/MapServer/0/query",
                BASE_PATH, FOLDER
            ));
        then.status(200).json_body(serde_json::json!({
            "features": [{"attributes": {
                "min_date": "09/02/2024 12:00:00 PM",
                "max_date": "09/10/2024 06:30:00 PM"
            }}]
        }));
    });
}

fn walker(server: &MockServer) -> DirectoryWalker {
    let client = FeatureServerClient::new();
    let resolver = ExtentResolver::new(client.clone(), DEFAULT_DATE_FIELD);
    DirectoryWalker::new(client, server.url(BASE_PATH), FOLDER, resolver)
}

#[tokio::test]
async fn test_fixture_walk_first_descriptor() {
    let server = MockServer::start();
    mount_fixture_directory(&server);

    let layers = walker(&server).list_layers().await.unwrap();

    assert_eq!(
        layers[0],
        LayerDescriptor {
            layer_id: 0,
            layer_name: "TC_CARINA_PS_Response".to_string(),
            min_date: Some(Utc.with_ymd_and_hms(2024, 7, 24, 4, 0, 0).unwrap()),
            max_date: Some(Utc.with_ymd_and_hms(2024, 8, 5, 4, 0, 0).unwrap()),
            service_url: server.url(format!(
                "{}/{}/TC_2024_000127_PHL_PDRF_PSResponse/MapServer",
                BASE_PATH, FOLDER
            )),
        }
    );
}

#[tokio::test]
async fn test_fixture_walk_covers_every_layer() {
    let server = MockServer::start();
    mount_fixture_directory(&server);

    let layers = walker(&server).list_layers().await.unwrap();

    let names: Vec<&str> = layers.iter().map(|l| l.layer_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "TC_CARINA_PS_Response",
            "TC_CARINA_Relief_Hubs",
            "TC_ENTENG_PS_Response"
        ]
    );

    for layer in &layers {
        assert_eq!(layer.min_date.is_some(), layer.max_date.is_some());
    }

    assert!(layers[1].min_date.is_none());
    assert_eq!(
        layers[2].max_date,
        Some(Utc.with_ymd_and_hms(2024, 9, 10, 18, 30, 0).unwrap())
    );
}

#[tokio::test]
async fn test_descriptor_serializes_rfc3339_dates() {
    let server = MockServer::start();
    mount_fixture_directory(&server);

    let layers = walker(&server).list_layers().await.unwrap();
    let json = serde_json::to_value(&layers[0]).unwrap();

    assert_eq!(json["min_date"], "2024-07-24T04:00:00Z");
    assert_eq!(json["max_date"], "2024-08-05T04:00:00Z");
    assert_eq!(serde_json::to_value(&layers[1]).unwrap()["min_date"], serde_json::Value::Null);
}
