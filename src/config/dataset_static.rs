use crate::utils::error::{Result, ScraperError};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// PDRF 在 HDX 上的固定 metadata
pub fn pdrf_defaults() -> BTreeMap<String, Value> {
    BTreeMap::from([
        ("caveats".to_string(), Value::Null),
        ("data_update_frequency".to_string(), json!(-1)),
        (
            "dataset_source".to_string(),
            json!("Philippine Disaster Resilience Foundation"),
        ),
        ("license_id".to_string(), json!("cc-by")),
        (
            "maintainer".to_string(),
            json!("fdbb8e79-f020-4039-ab3a-9adb482273b8"),
        ),
        ("methodology".to_string(), json!("Registry")),
        (
            "notes".to_string(),
            json!("Private Sector's Involvement (\"Who is doing What Where\")"),
        ),
        (
            "owner_org".to_string(),
            json!("c9acf432-a02a-4342-ba62-d22acca0af97"),
        ),
        ("package_creator".to_string(), json!("HDX Data Systems Team")),
        ("private".to_string(), json!(false)),
    ])
}

/// 讀取靜態欄位檔；`.json` 以 JSON 解析，其餘一律視為 TOML
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, Value>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(ScraperError::IoError)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let parsed = if is_json {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    } else {
        toml::from_str(&content).map_err(|e| e.to_string())
    };

    parsed.map_err(|message| ScraperError::ConfigValidationError {
        field: "dataset_static".to_string(),
        message: format!("{}: {}", path.display(), message),
    })
}
