use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 目錄列舉時暫存的服務資訊
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub name: String,
    pub service_type: String,
    pub url: String,
}

impl ServiceDescriptor {
    pub fn new(base_url: &str, name: String, service_type: String) -> Self {
        let url = format!("{}/{}/{}", base_url, name, service_type);
        Self {
            name,
            service_type,
            url,
        }
    }
}

/// Temporal extent of a layer's date field. Either both bounds or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateExtent {
    bounds: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl DateExtent {
    pub fn new(min_date: DateTime<Utc>, max_date: DateTime<Utc>) -> Self {
        Self {
            bounds: Some((min_date, max_date)),
        }
    }

    pub fn empty() -> Self {
        Self { bounds: None }
    }

    pub fn min_date(&self) -> Option<DateTime<Utc>> {
        self.bounds.map(|(min, _)| min)
    }

    pub fn max_date(&self) -> Option<DateTime<Utc>> {
        self.bounds.map(|(_, max)| max)
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    pub layer_id: i64,
    pub layer_name: String,
    pub min_date: Option<DateTime<Utc>>,
    pub max_date: Option<DateTime<Utc>>,
    pub service_url: String,
}

impl LayerDescriptor {
    pub fn new(layer_id: i64, layer_name: String, service_url: String, extent: DateExtent) -> Self {
        Self {
            layer_id,
            layer_name,
            min_date: extent.min_date(),
            max_date: extent.max_date(),
            service_url,
        }
    }

    pub fn layer_url(&self) -> String {
        format!("{}/{}", self.service_url, self.layer_id)
    }

    pub fn extent(&self) -> DateExtent {
        match (self.min_date, self.max_date) {
            (Some(min), Some(max)) => DateExtent::new(min, max),
            _ => DateExtent::empty(),
        }
    }
}

/// HDX approved-tags vocabulary.
pub const HDX_TAG_VOCABULARY_ID: &str = "b891512e-9516-4bf5-962a-7a289772a2a1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub vocabulary_id: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vocabulary_id: HDX_TAG_VOCABULARY_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceType {
    #[serde(rename = "file.upload")]
    FileUpload,
    #[serde(rename = "api")]
    Api,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlType {
    Upload,
    Api,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub description: String,
    pub format: String,
    pub resource_type: ResourceType,
    pub url_type: UrlType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Storage path of the uploaded file, for `file.upload` resources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl Resource {
    /// 上傳檔案型資源，`file_path` 同時作為名稱
    pub fn upload(file_path: String, description: String, format: &str) -> Self {
        Self {
            name: file_path.clone(),
            description,
            format: format.to_string(),
            resource_type: ResourceType::FileUpload,
            url_type: UrlType::Upload,
            url: None,
            file_path: Some(file_path),
        }
    }

    pub fn api(name: String, description: String, format: &str, url: String) -> Self {
        Self {
            name,
            description,
            format: format.to_string(),
            resource_type: ResourceType::Api,
            url_type: UrlType::Api,
            url: Some(url),
            file_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub title: String,
    pub dataset_date: Option<String>,
    pub groups: Vec<Group>,
    pub tags: Vec<Tag>,
    pub resources: Vec<Resource>,
    /// License、組織等靜態欄位，直接展開到頂層
    #[serde(flatten)]
    pub extras: BTreeMap<String, serde_json::Value>,
}

/// HDX 的時間區間格式：起日 00:00:00 到迄日 23:59:59
pub fn format_time_period(extent: &DateExtent) -> Option<String> {
    let (min, max) = (extent.min_date()?, extent.max_date()?);
    Some(format!(
        "[{}T00:00:00 TO {}T23:59:59]",
        min.format("%Y-%m-%d"),
        max.format("%Y-%m-%d")
    ))
}
